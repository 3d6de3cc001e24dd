use async_graphql::{Context, Error, Result};
use uuid::Uuid;

use crate::auth::Claims;
use crate::gql::error::GqlError;
use crate::gql::types::Role;
use crate::state::AppState;

/// The caller as seen by resolvers after the token has been checked.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub person_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Any authenticated caller. Does not touch the database.
pub fn require_auth(ctx: &Context<'_>) -> Result<AuthUser> {
    let claims = ctx
        .data::<Claims>()
        .map_err(|_| Error::new("You must be logged in to perform this action"))?;

    let person_id =
        Uuid::parse_str(&claims.sub).map_err(|e| Error::new(format!("Invalid user ID: {}", e)))?;

    Ok(AuthUser {
        person_id,
        email: claims.email.clone(),
        role: Role::from(claims.role.clone()),
    })
}

/// Check the caller's role against the token first, then against the stored profile
/// so that a demoted admin loses access before the token expires.
pub async fn require_role(ctx: &Context<'_>, required_role: Role) -> Result<AuthUser> {
    let mut user = require_auth(ctx)?;

    if !has_required_role(user.role, required_role) {
        return Err(access_denied(required_role, user.role));
    }

    let state = ctx.data::<AppState>()?;
    let profile = infra::repos::profiles::get_by_person(&state.db, user.person_id)
        .await
        .map_err(GqlError::from)?;
    user.role = profile.map(|p| Role::from(p.role)).unwrap_or(Role::User);

    if !has_required_role(user.role, required_role) {
        return Err(access_denied(required_role, user.role));
    }

    Ok(user)
}

pub async fn require_admin(ctx: &Context<'_>) -> Result<AuthUser> {
    require_role(ctx, Role::Admin).await
}

/// The person themself, or an administrator acting on their behalf.
pub async fn require_self_or_admin(ctx: &Context<'_>, person_id: Uuid) -> Result<AuthUser> {
    let user = require_auth(ctx)?;
    if user.person_id == person_id {
        return Ok(user);
    }
    require_admin(ctx).await.map_err(|_| {
        Error::new("Access denied: you can only access your own data")
    })
}

fn has_required_role(user_role: Role, required_role: Role) -> bool {
    match required_role {
        Role::Admin => user_role == Role::Admin,
        Role::User => true,
    }
}

fn access_denied(required_role: Role, current: Role) -> Error {
    match required_role {
        Role::Admin => Error::new(format!(
            "Access denied: Administrator privileges required. Your current role is {:?}",
            current
        )),
        Role::User => Error::new("Access denied"),
    }
}
