use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use super::service::{self, SignInParams};
use crate::auth::permissions::{require_admin, require_auth, require_self_or_admin};
use crate::gql::error::GqlError;
use crate::gql::types::{
    Registration, RegistrationFilterInput, SignInToContestInput, UpdateRegistrationInput,
};
use crate::state::AppState;
use infra::models::RegistrationRow;
use infra::repos::{registrations, RegistrationFilter};

#[derive(Default)]
pub struct RegistrationQuery;

#[Object]
impl RegistrationQuery {
    /// Registrations filtered by competition and/or person (admin only).
    async fn registrations(
        &self,
        ctx: &Context<'_>,
        filter: Option<RegistrationFilterInput>,
    ) -> Result<Vec<Registration>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let filter = filter.unwrap_or_default();
        let filter = RegistrationFilter {
            competition_id: filter.competition_id,
            person_id: filter.person_id,
            with_run_number: filter.with_run_number.unwrap_or(false),
        };
        let rows = registrations::list(&state.db, &filter)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }

    async fn registration(&self, ctx: &Context<'_>, id: Uuid) -> Result<Registration> {
        let state = ctx.data::<AppState>()?;
        Ok(load_owned(ctx, state, id).await?.into())
    }

    /// Registrations of the logged-in person.
    async fn my_registrations(&self, ctx: &Context<'_>) -> Result<Vec<Registration>> {
        let user = require_auth(ctx)?;
        let state = ctx.data::<AppState>()?;

        let filter = RegistrationFilter {
            person_id: Some(user.person_id),
            ..Default::default()
        };
        let rows = registrations::list(&state.db, &filter)
            .await
            .map_err(GqlError::from)?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }
}

#[derive(Default)]
pub struct RegistrationMutation;

#[Object]
impl RegistrationMutation {
    /// Registers the caller, or with `personId` any person (admin only), for a distance.
    async fn sign_in_to_contest(
        &self,
        ctx: &Context<'_>,
        input: SignInToContestInput,
    ) -> Result<Registration> {
        let user = require_auth(ctx)?;
        let person_id = match input.person_id {
            Some(person_id) if person_id != user.person_id => {
                require_admin(ctx).await?;
                person_id
            }
            _ => user.person_id,
        };
        let state = ctx.data::<AppState>()?;

        let row = service::sign_in_to_contest(
            &state.db,
            SignInParams {
                person_id,
                competition_id: input.competition_id,
                distance_name: input.distance_name,
            },
        )
        .await?;
        Ok(row.into())
    }

    /// Sets the run number (-1 clears it) and/or the paid flag.
    async fn update_registration(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateRegistrationInput,
    ) -> Result<Registration> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let row = service::update_registration(
            &state.db,
            state.results_cache(),
            id,
            input.run_number,
            input.paid,
        )
        .await?;
        Ok(row.into())
    }

    async fn change_distance(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        distance_name: String,
    ) -> Result<Registration> {
        let state = ctx.data::<AppState>()?;
        let registration = load_owned(ctx, state, id).await?;

        let row = service::change_distance(
            &state.db,
            state.results_cache(),
            &registration,
            &distance_name,
        )
        .await?;
        Ok(row.into())
    }

    async fn delete_registration(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let state = ctx.data::<AppState>()?;
        let registration = load_owned(ctx, state, id).await?;

        registrations::delete(&state.db, id)
            .await
            .map_err(GqlError::from)?;
        state
            .results_cache()
            .invalidate_competition(registration.competition_id);
        Ok(true)
    }
}

/// Loads a registration the caller owns, or any registration for an admin.
async fn load_owned(
    ctx: &Context<'_>,
    state: &AppState,
    id: Uuid,
) -> Result<RegistrationRow> {
    require_auth(ctx)?;
    let row = registrations::get_by_id(&state.db, id)
        .await
        .map_err(GqlError::from)?
        .ok_or_else(|| GqlError::not_found("Registration not found"))?;
    require_self_or_admin(ctx, row.person_id).await?;
    Ok(row)
}
