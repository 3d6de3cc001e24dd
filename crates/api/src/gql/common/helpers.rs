use uuid::Uuid;

use crate::gql::error::GqlError;
use infra::models::{CompetitionRow, PersonRow};

pub async fn get_competition(
    db: &infra::db::Db,
    competition_id: Uuid,
) -> Result<CompetitionRow, GqlError> {
    infra::repos::competitions::get_by_id(db, competition_id)
        .await?
        .ok_or_else(|| GqlError::not_found("Competition not found"))
}

pub async fn get_person(db: &infra::db::Db, person_id: Uuid) -> Result<PersonRow, GqlError> {
    infra::repos::persons::get_by_id(db, person_id)
        .await?
        .ok_or_else(|| GqlError::not_found("Person not found"))
}

/// Trimmed, non-empty text or an error naming the field.
pub fn required_text(value: &str, field: &str, max_len: usize) -> Result<String, GqlError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GqlError::invalid(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(GqlError::invalid(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}
