use async_graphql::{Context, Object, Result};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::permissions::{require_admin, require_auth, require_self_or_admin};
use crate::gql::common::helpers::{get_person, required_text};
use crate::gql::error::{is_unique_violation, GqlError};
use crate::gql::types::{
    CreatePersonInput, PaginatedResponse, PaginationInput, Person, Profile, Role,
    UpdatePersonInput,
};
use crate::routes::auth::send_confirmation;
use crate::services::email_service::Locale;
use crate::state::AppState;
use infra::repos::{persons, profiles, CreatePersonData, PersonFilter, UpdatePersonData};

#[derive(Default)]
pub struct PersonQuery;

#[Object]
impl PersonQuery {
    /// Search persons by first name, last name or email (admin only).
    async fn persons(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        pagination: Option<PaginationInput>,
    ) -> Result<PaginatedResponse<Person>> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        let page = pagination.unwrap_or_default().to_limit_offset();
        let filter = PersonFilter {
            search,
            club_id: None,
        };

        let (rows, total_count) = tokio::try_join!(
            persons::list(&state.db, &filter, Some(page)),
            persons::count(&state.db, &filter)
        )
        .map_err(GqlError::from)?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Person::from).collect(),
            total_count,
            page,
        ))
    }

    async fn person(&self, ctx: &Context<'_>, id: Uuid) -> Result<Person> {
        require_self_or_admin(ctx, id).await?;
        let state = ctx.data::<AppState>()?;
        Ok(get_person(&state.db, id).await?.into())
    }

    /// The logged-in person.
    async fn me(&self, ctx: &Context<'_>) -> Result<Person> {
        let user = require_auth(ctx)?;
        let state = ctx.data::<AppState>()?;
        Ok(get_person(&state.db, user.person_id).await?.into())
    }

    async fn my_profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let user = require_auth(ctx)?;
        let state = ctx.data::<AppState>()?;
        Ok(profiles::get_by_person(&state.db, user.person_id)
            .await
            .map_err(GqlError::from)?
            .map(Profile::from))
    }
}

#[derive(Default)]
pub struct PersonMutation;

#[Object]
impl PersonMutation {
    /// Add a participant without login credentials (admin only).
    async fn create_person(&self, ctx: &Context<'_>, input: CreatePersonInput) -> Result<Person> {
        require_admin(ctx).await?;
        let state = ctx.data::<AppState>()?;

        validate_birth_date(input.birth_date)?;
        let data = CreatePersonData {
            first_name: required_text(&input.first_name, "First name", 50)?,
            last_name: required_text(&input.last_name, "Last name", 50)?,
            birth_date: input.birth_date,
            gender: input.gender.as_code().to_string(),
            email: normalize_email(input.email)?,
            iban_number: input.iban_number.filter(|i| !i.trim().is_empty()),
            club_id: input.club_id,
            password_hash: None,
        };

        let row = persons::create(&state.db, &data)
            .await
            .map_err(email_conflict)?;

        tracing::info!(person_id = %row.id, "Person created");
        Ok(row.into())
    }

    async fn update_person(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdatePersonInput,
    ) -> Result<Person> {
        require_self_or_admin(ctx, id).await?;
        let state = ctx.data::<AppState>()?;

        if let Some(birth_date) = input.birth_date {
            validate_birth_date(birth_date)?;
        }
        let data = UpdatePersonData {
            first_name: input
                .first_name
                .as_deref()
                .map(|v| required_text(v, "First name", 50))
                .transpose()?,
            last_name: input
                .last_name
                .as_deref()
                .map(|v| required_text(v, "Last name", 50))
                .transpose()?,
            birth_date: input.birth_date,
            gender: input.gender.map(|g| g.as_code().to_string()),
            email: normalize_email(input.email)?,
            iban_number: input.iban_number,
            club_id: input.club_id,
        };

        let before = get_person(&state.db, id).await?;
        let row = persons::update(&state.db, id, &data)
            .await
            .map_err(email_conflict)?
            .ok_or_else(|| GqlError::not_found("Person not found"))?;

        let lowered = |email: &Option<String>| email.as_deref().map(str::to_lowercase);
        if lowered(&before.email) != lowered(&row.email) {
            send_confirmation(state, &row, Locale::default())
                .await
                .map_err(GqlError::from)?;
        }
        // Names, birth date and gender all show up in ranked results.
        state.results_cache().clear();

        Ok(row.into())
    }

    async fn delete_person(&self, ctx: &Context<'_>, id: Uuid) -> Result<bool> {
        let admin = require_admin(ctx).await?;
        if admin.person_id == id {
            return Err(GqlError::invalid("You cannot delete your own account").into());
        }
        let state = ctx.data::<AppState>()?;

        let deleted = persons::delete(&state.db, id)
            .await
            .map_err(GqlError::from)?;
        if deleted == 0 {
            return Err(GqlError::not_found("Person not found").into());
        }
        state.results_cache().clear();
        Ok(true)
    }

    async fn update_profile_role(
        &self,
        ctx: &Context<'_>,
        person_id: Uuid,
        role: Role,
    ) -> Result<Profile> {
        let admin = require_admin(ctx).await?;
        if admin.person_id == person_id && role != Role::Admin {
            return Err(GqlError::invalid("You cannot remove your own administrator role").into());
        }
        let state = ctx.data::<AppState>()?;

        get_person(&state.db, person_id).await?;
        let profile = profiles::upsert_role(&state.db, person_id, role.as_str())
            .await
            .map_err(GqlError::from)?;

        tracing::info!(%person_id, role = role.as_str(), "Profile role updated");
        Ok(profile.into())
    }
}

fn validate_birth_date(birth_date: chrono::NaiveDate) -> Result<(), GqlError> {
    if birth_date > Utc::now().date_naive() {
        return Err(GqlError::invalid("Birth date cannot be in the future"));
    }
    Ok(())
}

pub(crate) fn normalize_email(email: Option<String>) -> Result<Option<String>, GqlError> {
    match email.map(|e| e.trim().to_lowercase()) {
        None => Ok(None),
        Some(e) if e.is_empty() => Ok(None),
        Some(e) if !e.contains('@') || e.len() > 255 => {
            Err(GqlError::invalid("Invalid email address"))
        }
        Some(e) => Ok(Some(e)),
    }
}

fn email_conflict(e: sqlx::Error) -> GqlError {
    if is_unique_violation(&e) {
        GqlError::conflict("Email already in use")
    } else {
        e.into()
    }
}
