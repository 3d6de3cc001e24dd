use async_graphql::{Context, Object, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::service;
use crate::auth::permissions::{require_admin, require_auth};
use crate::gql::types::{Registration, ResultEntry, RunTime, RunTimeEntryInput};
use crate::state::AppState;

#[derive(Default)]
pub struct ResultQuery;

#[Object]
impl ResultQuery {
    /// Timed results of a competition, fastest first.
    async fn competition_results(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
    ) -> Result<Vec<ResultEntry>> {
        let state = ctx.data::<AppState>()?;
        let results =
            service::competition_results(&state.db, state.results_cache(), competition_id).await?;
        Ok(results.iter().map(ResultEntry::from).collect())
    }

    /// Results of all competitions that count for the season ranking.
    async fn ranking_results(&self, ctx: &Context<'_>) -> Result<Vec<ResultEntry>> {
        let state = ctx.data::<AppState>()?;
        let results = service::ranking_results(&state.db, state.results_cache()).await?;
        Ok(results.iter().map(ResultEntry::from).collect())
    }

    async fn person_results(&self, ctx: &Context<'_>, person_id: Uuid) -> Result<Vec<ResultEntry>> {
        let state = ctx.data::<AppState>()?;
        let results = service::person_results(&state.db, state.results_cache(), person_id).await?;
        Ok(results.iter().map(ResultEntry::from).collect())
    }

    async fn my_results(&self, ctx: &Context<'_>) -> Result<Vec<ResultEntry>> {
        let user = require_auth(ctx)?;
        let state = ctx.data::<AppState>()?;
        let results =
            service::person_results(&state.db, state.results_cache(), user.person_id).await?;
        Ok(results.iter().map(ResultEntry::from).collect())
    }
}

#[derive(Default)]
pub struct ResultMutation;

#[Object]
impl ResultMutation {
    /// Sets a run time, or clears it when `runTime` is null.
    async fn record_run_time(
        &self,
        ctx: &Context<'_>,
        registration_id: Uuid,
        run_time: Option<RunTime>,
    ) -> Result<Registration> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = service::record_run_time(
            &state.db,
            state.results_cache(),
            registration_id,
            run_time.map(|t| t.0),
        )
        .await?;
        Ok(row.into())
    }

    /// Records the moment a runner crossed the finish line.
    async fn record_finish(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
        run_number: i32,
        finish_time: DateTime<Utc>,
    ) -> Result<Registration> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = service::record_finish(
            &state.db,
            state.results_cache(),
            competition_id,
            run_number,
            finish_time,
        )
        .await?;
        Ok(row.into())
    }

    async fn record_run_times_bulk(
        &self,
        ctx: &Context<'_>,
        competition_id: Uuid,
        entries: Vec<RunTimeEntryInput>,
    ) -> Result<Vec<Registration>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let entries: Vec<(i32, infra::run_time::RunTime)> = entries
            .into_iter()
            .map(|e| (e.run_number, e.run_time.0))
            .collect();
        let rows = service::record_run_times_bulk(
            &state.db,
            state.results_cache(),
            competition_id,
            &entries,
        )
        .await?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }
}
