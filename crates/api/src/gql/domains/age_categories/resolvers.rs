use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::require_admin;
use crate::gql::common::helpers::required_text;
use crate::gql::error::{is_foreign_key_violation, is_unique_violation, GqlError};
use crate::gql::types::{AgeCategory, CreateAgeCategoryInput};
use crate::state::AppState;
use infra::models::AgeCategoryRow;
use infra::repos::age_categories;

#[derive(Default)]
pub struct AgeCategoryQuery;

#[Object]
impl AgeCategoryQuery {
    /// All age categories, youngest first.
    async fn age_categories(&self, ctx: &Context<'_>) -> Result<Vec<AgeCategory>> {
        let state = ctx.data::<AppState>()?;
        let rows = age_categories::list(&state.db)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(AgeCategory::from).collect())
    }

    async fn age_category_for_age(&self, ctx: &Context<'_>, age: i32) -> Result<AgeCategory> {
        let state = ctx.data::<AppState>()?;
        let row = age_categories::find_for_age(&state.db, age)
            .await
            .map_err(GqlError::from)?
            .ok_or_else(|| no_category_for_age(age))?;
        Ok(row.into())
    }
}

#[derive(Default)]
pub struct AgeCategoryMutation;

#[Object]
impl AgeCategoryMutation {
    async fn create_age_category(
        &self,
        ctx: &Context<'_>,
        input: CreateAgeCategoryInput,
    ) -> Result<AgeCategory> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let name = required_text(&input.name, "Name", 100)?;
        let existing = age_categories::list(&state.db)
            .await
            .map_err(GqlError::from)?;
        validate_range(&existing, input.minimum_age, input.maximum_age)?;

        let row = age_categories::create(&state.db, &name, input.minimum_age, input.maximum_age)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    GqlError::conflict("Age category already exists")
                } else {
                    e.into()
                }
            })?;
        Ok(row.into())
    }

    async fn delete_age_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let deleted = age_categories::delete(&state.db, id)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    GqlError::conflict("Age category is still used by competitions")
                } else {
                    e.into()
                }
            })?;
        if deleted == 0 {
            return Err(GqlError::not_found("Age category not found").into());
        }
        state.results_cache().clear();
        Ok(true)
    }
}

pub(crate) fn no_category_for_age(age: i32) -> GqlError {
    GqlError::not_found(format!("No age category for age {age}"))
}

fn validate_range(
    existing: &[AgeCategoryRow],
    minimum_age: i32,
    maximum_age: i32,
) -> Result<(), GqlError> {
    if minimum_age < 0 {
        return Err(GqlError::invalid("Minimum age cannot be negative"));
    }
    if minimum_age > maximum_age {
        return Err(GqlError::invalid(
            "Minimum age must not be greater than maximum age",
        ));
    }
    if let Some(other) = existing
        .iter()
        .find(|c| c.overlaps(minimum_age, maximum_age))
    {
        return Err(GqlError::conflict(format!(
            "Age range {minimum_age}-{maximum_age} overlaps with category {}",
            other.name
        )));
    }
    Ok(())
}
