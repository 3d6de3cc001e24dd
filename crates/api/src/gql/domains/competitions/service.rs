use uuid::Uuid;

use infra::categories::{seed_plan, Distance};
use infra::models::{CompetitionPerCategoryRow, CompetitionRow};
use infra::repos::{
    age_categories, competition_per_categories, competitions, CreateCompetitionData,
    UpdateCompetitionData,
};

use super::types::DistanceInput;
use crate::gql::error::GqlError;
use crate::services::ResultsCache;

const MAX_DISTANCE_NAME: usize = 30;

/// Output of the create-competition workflow.
pub struct CreatedCompetition {
    pub competition: CompetitionRow,
    pub buckets: Vec<CompetitionPerCategoryRow>,
}

/// Checks distance input and converts it to the bucket plan representation.
pub fn validate_distances(input: &[DistanceInput]) -> Result<Vec<Distance>, GqlError> {
    if input.is_empty() {
        return Err(GqlError::invalid("At least one distance is required"));
    }

    let mut distances: Vec<Distance> = Vec::with_capacity(input.len());
    for item in input {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(GqlError::invalid("Distance name is required"));
        }
        if name.chars().count() > MAX_DISTANCE_NAME {
            return Err(GqlError::invalid(format!(
                "Distance name must be at most {MAX_DISTANCE_NAME} characters"
            )));
        }
        if !item.km.is_finite() || item.km <= 0.0 {
            return Err(GqlError::invalid(format!(
                "Distance {name} must be longer than 0 km"
            )));
        }
        if distances.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
            return Err(GqlError::invalid(format!("Duplicate distance name: {name}")));
        }
        distances.push(Distance {
            name: name.to_string(),
            km: item.km as f32,
        });
    }
    Ok(distances)
}

/// Insert a competition and seed its buckets inside one transaction.
///
/// Every age category gets a bucket for every distance and both genders.
pub async fn create_competition(
    pool: &sqlx::PgPool,
    data: CreateCompetitionData,
    distances: &[Distance],
) -> Result<CreatedCompetition, GqlError> {
    let mut tx = pool.begin().await?;

    let competition = competitions::create(&mut *tx, &data).await?;
    let categories = age_categories::list(&mut *tx).await?;
    if categories.is_empty() {
        return Err(GqlError::invalid(
            "Cannot create a competition without age categories",
        ));
    }

    let plan = seed_plan(&categories, distances);
    let buckets = competition_per_categories::insert_plan(&mut *tx, competition.id, &plan).await?;

    tx.commit().await?;

    tracing::info!(
        competition_id = %competition.id,
        buckets = buckets.len(),
        "Competition created"
    );
    Ok(CreatedCompetition {
        competition,
        buckets,
    })
}

/// Applies a partial update. Changing either visibility flag drops the cached ranking.
pub async fn update_competition(
    pool: &sqlx::PgPool,
    cache: &ResultsCache,
    id: Uuid,
    data: UpdateCompetitionData,
) -> Result<CompetitionRow, GqlError> {
    let before = competitions::get_by_id(pool, id)
        .await?
        .ok_or_else(|| GqlError::not_found("Competition not found"))?;

    let after = competitions::update(pool, id, &data)
        .await?
        .ok_or_else(|| GqlError::not_found("Competition not found"))?;

    if before.ranking_active != after.ranking_active || before.active != after.active {
        cache.invalidate_ranking();
    }
    if before.date != after.date {
        cache.invalidate_competition(id);
    }
    Ok(after)
}

/// Updates the length of existing distances. Names without buckets are skipped.
pub async fn update_distances(
    pool: &sqlx::PgPool,
    competition_id: Uuid,
    distances: &[Distance],
) -> Result<Vec<CompetitionPerCategoryRow>, GqlError> {
    let mut tx = pool.begin().await?;

    for distance in distances {
        let updated = competition_per_categories::update_distance_km(
            &mut *tx,
            competition_id,
            &distance.name,
            distance.km,
        )
        .await?;
        if updated == 0 {
            tracing::debug!(%competition_id, distance = %distance.name, "Unknown distance skipped");
        }
    }

    let buckets = competition_per_categories::list_by_competition(&mut *tx, competition_id).await?;
    tx.commit().await?;
    Ok(buckets)
}
