use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use crate::auth::permissions::{require_admin, require_auth};
use crate::gql::common::helpers::required_text;
use crate::gql::error::{is_unique_violation, GqlError};
use crate::gql::types::{Club, ClubWithMembers, CreateClubInput, Person, UpdateClubInput};
use crate::state::AppState;
use infra::repos::clubs;

const CLUB_EXISTS: &str = "Club already exists";

#[derive(Default)]
pub struct ClubQuery;

#[Object]
impl ClubQuery {
    async fn clubs(&self, ctx: &Context<'_>) -> Result<Vec<Club>> {
        let state = ctx.data::<AppState>()?;
        let rows = clubs::list(&state.db).await.map_err(GqlError::from)?;
        Ok(rows.into_iter().map(Club::from).collect())
    }

    async fn club(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<Club>> {
        let state = ctx.data::<AppState>()?;
        let row = clubs::get_by_id(&state.db, id)
            .await
            .map_err(GqlError::from)?;
        Ok(row.map(Club::from))
    }

    /// A club together with its members. Requires a logged-in user.
    async fn club_with_members(&self, ctx: &Context<'_>, id: Uuid) -> Result<ClubWithMembers> {
        require_auth(ctx)?;
        let state = ctx.data::<AppState>()?;

        let (club, members) = tokio::try_join!(
            clubs::get_by_id(&state.db, id),
            clubs::list_members(&state.db, id)
        )
        .map_err(GqlError::from)?;
        let club = club.ok_or_else(|| GqlError::not_found("Club not found"))?;

        Ok(ClubWithMembers {
            club: club.into(),
            members: members.into_iter().map(Person::from).collect(),
        })
    }
}

#[derive(Default)]
pub struct ClubMutation;

#[Object]
impl ClubMutation {
    async fn create_club(&self, ctx: &Context<'_>, input: CreateClubInput) -> Result<Club> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;
        let name = required_text(&input.name, "Club name", 100)?;

        if clubs::exists_by_name(&state.db, &name, None)
            .await
            .map_err(GqlError::from)?
        {
            return Err(GqlError::conflict(CLUB_EXISTS).into());
        }

        let mut tx = state.db.begin().await.map_err(GqlError::from)?;
        let club = clubs::create(&mut *tx, &name).await.map_err(club_conflict)?;
        if let Some(member_ids) = &input.member_ids {
            clubs::replace_members(&mut tx, club.id, member_ids)
                .await
                .map_err(GqlError::from)?;
        }
        tx.commit().await.map_err(GqlError::from)?;
        if input.member_ids.is_some() {
            state.results_cache().clear();
        }

        tracing::info!(club_id = %club.id, "Club created");
        Ok(club.into())
    }

    async fn update_club(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateClubInput,
    ) -> Result<Club> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let name = input
            .name
            .as_deref()
            .map(|n| required_text(n, "Club name", 100))
            .transpose()?;
        if let Some(name) = &name {
            if clubs::exists_by_name(&state.db, name, Some(id))
                .await
                .map_err(GqlError::from)?
            {
                return Err(GqlError::conflict(CLUB_EXISTS).into());
            }
        }

        let mut tx = state.db.begin().await.map_err(GqlError::from)?;
        let club = clubs::update_name(&mut *tx, id, name.as_deref())
            .await
            .map_err(club_conflict)?
            .ok_or_else(|| GqlError::not_found("Club not found"))?;
        if let Some(member_ids) = &input.member_ids {
            clubs::replace_members(&mut tx, id, member_ids)
                .await
                .map_err(GqlError::from)?;
        }
        tx.commit().await.map_err(GqlError::from)?;
        if input.member_ids.is_some() {
            state.results_cache().clear();
        }

        Ok(club.into())
    }

    /// Deletes a club; its members stay as persons without a club.
    async fn delete_club(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let deleted = clubs::delete(&state.db, id).await.map_err(GqlError::from)?;
        if deleted == 0 {
            return Err(GqlError::not_found("Club not found").into());
        }
        state.results_cache().clear();
        Ok(true)
    }
}

fn club_conflict(e: sqlx::Error) -> GqlError {
    if is_unique_violation(&e) {
        GqlError::conflict(CLUB_EXISTS)
    } else {
        e.into()
    }
}
