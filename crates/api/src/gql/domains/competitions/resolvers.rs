use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use super::service;
use crate::auth::permissions::require_admin;
use crate::gql::common::helpers::{get_competition, required_text};
use crate::gql::error::GqlError;
use crate::gql::types::{
    Competition, CompetitionFilterInput, CompetitionPerCategory, CreateCompetitionInput,
    DistanceInput, PaginatedResponse, PaginationInput, UpdateCompetitionInput,
};
use crate::state::AppState;
use infra::repos::{
    competitions, CompetitionFilter, CreateCompetitionData, UpdateCompetitionData,
};

#[derive(Default)]
pub struct CompetitionQuery;

#[Object]
impl CompetitionQuery {
    /// Competitions ordered by date, optionally filtered by name, date range and activity.
    async fn competitions(
        &self,
        ctx: &Context<'_>,
        filter: Option<CompetitionFilterInput>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Competition>> {
        let state = ctx.data::<AppState>()?;

        let page = pagination.unwrap_or_default().to_limit_offset();
        let filter = filter.unwrap_or_default();
        let filter = CompetitionFilter {
            name: filter.name,
            from: filter.from,
            to: filter.to,
            active_only: filter.active_only.unwrap_or(false),
        };

        let (rows, total_count) = tokio::try_join!(
            competitions::list(&state.db, &filter, Some(page)),
            competitions::count(&state.db, &filter)
        )
        .map_err(GqlError::from)?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Competition::from).collect(),
            total_count,
            page,
        ))
    }

    async fn competition(&self, ctx: &Context<'_>, id: Uuid) -> Result<Competition> {
        let state = ctx.data::<AppState>()?;
        Ok(get_competition(&state.db, id).await?.into())
    }

    /// Competitions that count towards the season ranking.
    async fn ranking_competitions(&self, ctx: &Context<'_>) -> Result<Vec<Competition>> {
        let state = ctx.data::<AppState>()?;
        let rows = competitions::list_ranking(&state.db)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(Competition::from).collect())
    }
}

#[derive(Default)]
pub struct CompetitionMutation;

#[Object]
impl CompetitionMutation {
    async fn create_competition(
        &self,
        ctx: &Context<'_>,
        input: CreateCompetitionInput,
    ) -> Result<Competition> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let distances = service::validate_distances(&input.distances)?;
        let data = CreateCompetitionData {
            name: required_text(&input.name, "Competition name", 100)?,
            information: input.information,
            date: input.date,
            active: input.active.unwrap_or(false),
            ranking_active: input.ranking_active.unwrap_or(false),
            img_url: input.img_url,
            url: input.url,
        };

        let created = service::create_competition(&state.db, data, &distances).await?;
        Ok(created.competition.into())
    }

    async fn update_competition(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateCompetitionInput,
    ) -> Result<Competition> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_text(n, "Competition name", 100))
            .transpose()?;
        let data = UpdateCompetitionData {
            name,
            information: input.information,
            date: input.date,
            active: input.active,
            ranking_active: input.ranking_active,
            img_url: input.img_url,
            url: input.url,
        };

        let row =
            service::update_competition(&state.db, state.results_cache(), id, data).await?;
        Ok(row.into())
    }

    /// Changes the length of existing distances and returns all buckets of the competition.
    async fn update_distances(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
        distances: Vec<DistanceInput>,
    ) -> Result<Vec<CompetitionPerCategory>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        get_competition(&state.db, competition_id).await?;
        let distances = service::validate_distances(&distances)?;
        let buckets = service::update_distances(&state.db, competition_id, &distances).await?;
        state.results_cache().invalidate_competition(competition_id);

        Ok(buckets.into_iter().map(CompetitionPerCategory::from).collect())
    }

    /// Deletes a competition with its buckets and registrations.
    async fn delete_competition(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let deleted = competitions::delete(&state.db, id)
            .await
            .map_err(GqlError::from)?;
        if deleted == 0 {
            return Err(GqlError::not_found("Competition not found").into());
        }
        state.results_cache().invalidate_competition(id);

        tracing::info!(competition_id = %id, "Competition deleted");
        Ok(true)
    }
}
