use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};

use crate::auth::cookie::extract_cookie;
use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Where a token was presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    Bearer(String),
    Cookie(String),
}

/// Finds the token in the `Authorization: Bearer` header, falling back to the auth cookie.
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<TokenSource> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(TokenSource::Bearer(token.to_string()));
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| extract_cookie(value, cookie_name))
        .map(TokenSource::Cookie)
}

/// Verifies a token and checks it has not been revoked by a logout.
pub async fn verify(state: &AppState, token: &str) -> Result<Claims, AppError> {
    let claims = state.jwt_service().verify_token(token)?;
    let jti = claims.token_id()?;
    if infra::repos::revoked_tokens::is_revoked(&state.db, jti).await? {
        return Err(AppError::Unauthorized("Token has been revoked".to_string()));
    }
    Ok(claims)
}

/// JWT middleware that validates the caller's token and adds the claims to the
/// request extensions for handlers and the GraphQL context.
///
/// A bad bearer token is rejected outright. A bad cookie is ignored so that a stale
/// cookie does not lock the browser out of public queries.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match token_from_headers(request.headers(), &state.auth_config().cookie_name) {
        Some(TokenSource::Bearer(token)) => {
            let claims = verify(&state, &token).await?;
            request.extensions_mut().insert::<Claims>(claims);
        }
        Some(TokenSource::Cookie(token)) => match verify(&state, &token).await {
            Ok(claims) => {
                request.extensions_mut().insert::<Claims>(claims);
            }
            Err(AppError::Unauthorized(reason)) => {
                tracing::debug!(%reason, "Ignoring auth cookie");
            }
            Err(e) => return Err(e),
        },
        None => {}
    }

    Ok(next.run(request).await)
}
