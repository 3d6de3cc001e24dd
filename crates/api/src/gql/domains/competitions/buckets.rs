use async_graphql::{Context, Object, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::permissions::require_admin;
use crate::gql::error::GqlError;
use crate::gql::types::{CompetitionPerCategory, Gender};
use crate::state::AppState;
use infra::repos::competition_per_categories;

pub(crate) const BUCKET_NOT_FOUND: &str = "This competition per category doesn't exist";

#[derive(Default)]
pub struct CompetitionPerCategoryQuery;

#[Object]
impl CompetitionPerCategoryQuery {
    async fn competition_per_categories(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
    ) -> Result<Vec<CompetitionPerCategory>> {
        let state = ctx.data::<AppState>()?;
        let rows = competition_per_categories::list_by_competition(&state.db, competition_id)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(CompetitionPerCategory::from).collect())
    }

    async fn competition_per_category(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> Result<CompetitionPerCategory> {
        let state = ctx.data::<AppState>()?;
        let row = competition_per_categories::get_by_id(&state.db, id)
            .await
            .map_err(GqlError::from)?
            .ok_or_else(|| GqlError::not_found(BUCKET_NOT_FOUND))?;
        Ok(row.into())
    }

    async fn find_competition_per_category(
        &self,
        ctx: &Context<'_>,
        age_category_id: Uuid,
        distance_name: String,
        gender: Gender,
        competition_id: Uuid,
    ) -> Result<CompetitionPerCategory> {
        let state = ctx.data::<AppState>()?;
        let row = competition_per_categories::find_by_parameters(
            &state.db,
            age_category_id,
            distance_name.trim(),
            gender.as_code(),
            competition_id,
        )
        .await
        .map_err(GqlError::from)?
        .ok_or_else(|| GqlError::not_found(BUCKET_NOT_FOUND))?;
        Ok(row.into())
    }
}

#[derive(Default)]
pub struct CompetitionPerCategoryMutation;

#[Object]
impl CompetitionPerCategoryMutation {
    /// Sets the start time for a whole competition, or for one distance only.
    /// Returns the number of buckets that were updated.
    async fn set_gun_time(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
        gun_time: DateTime<Utc>,
        distance_name: Option<String>,
    ) -> Result<i32> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let updated = competition_per_categories::set_gun_time(
            &state.db,
            competition_id,
            gun_time,
            distance_name.as_deref().map(str::trim),
        )
        .await
        .map_err(GqlError::from)?;
        if updated == 0 {
            return Err(GqlError::not_found("Competition not found").into());
        }

        tracing::info!(%competition_id, buckets = updated, "Gun time set");
        Ok(updated as i32)
    }

    async fn delete_competition_per_category(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let bucket = competition_per_categories::get_by_id(&state.db, id)
            .await
            .map_err(GqlError::from)?
            .ok_or_else(|| GqlError::not_found(BUCKET_NOT_FOUND))?;
        competition_per_categories::delete(&state.db, id)
            .await
            .map_err(GqlError::from)?;
        state
            .results_cache()
            .invalidate_competition(bucket.competition_id);
        Ok(true)
    }
}
