use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::cookie::{build_auth_cookie, build_clear_cookie};
use crate::auth::tokens::{generate_token, hash_token};
use crate::auth::{Claims, PasswordService};
use crate::error::AppError;
use crate::gql::domains::persons::resolvers::normalize_email;
use crate::gql::types::Role;
use crate::services::email_service::Locale;
use crate::state::AppState;
use infra::models::{Gender, PersonRow};
use infra::repos::{persons, profiles, revoked_tokens, CreatePersonData};

const INVALID_CREDENTIALS: &str = "The given user information was incorrect.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    /// `M` or `V`
    pub gender: String,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
    pub locale: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
    pub locale: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct ConfirmEmailRequest {
    pub token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: String,
    pub is_email_confirmed: bool,
}

impl PersonResponse {
    fn new(person: PersonRow, role: String) -> Self {
        Self {
            id: person.id,
            first_name: person.first_name,
            last_name: person.last_name,
            email: person.email,
            role,
            is_email_confirmed: person.is_email_confirmed,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub person: PersonResponse,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Account registration
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(Some(req.email))?
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
    PasswordService::validate_strength(&req.password)?;
    let gender: Gender = req.gender.parse().map_err(AppError::BadRequest)?;
    let first_name = required(&req.first_name, "First name")?;
    let last_name = required(&req.last_name, "Last name")?;

    if persons::email_exists(&state.db, &email).await? {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let password_hash = PasswordService::hash_password(&req.password)?;
    let data = CreatePersonData {
        first_name,
        last_name,
        birth_date: req.birth_date,
        gender: gender.as_code().to_string(),
        email: Some(email),
        iban_number: req.iban_number.filter(|i| !i.trim().is_empty()),
        club_id: req.club_id,
        password_hash: Some(password_hash),
    };

    let mut tx = state.db.begin().await?;
    let person = persons::create(&mut *tx, &data).await.map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Email already in use".to_string())
        }
        _ => AppError::Db(e),
    })?;
    // The first account of a fresh installation administers it.
    profiles::lock_admin_election(&mut *tx).await?;
    let role = if profiles::any_admin(&mut *tx).await? {
        Role::User
    } else {
        Role::Admin
    };
    profiles::create(&mut *tx, person.id, role.as_str()).await?;
    tx.commit().await?;

    tracing::info!(person_id = %person.id, role = role.as_str(), "Account registered");

    let locale = Locale::from_str_lossy(req.locale.as_deref().unwrap_or("nl"));
    send_confirmation(&state, &person, locale).await?;

    Ok((
        StatusCode::CREATED,
        Json(PersonResponse::new(person, role.as_str().to_string())),
    ))
}

/// Email and password login. The token is returned in the body and as an HttpOnly cookie.
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let invalid = || AppError::Unauthorized(INVALID_CREDENTIALS.to_string());

    let credentials = persons::credentials_by_email(&state.db, req.email.trim())
        .await?
        .ok_or_else(invalid)?;
    let password_ok = credentials
        .password_hash
        .as_deref()
        .is_some_and(|hash| PasswordService::verify_password(&req.password, hash));
    if !password_ok {
        tracing::info!(person_id = %credentials.id, "Login rejected");
        return Err(invalid());
    }

    let person = persons::get_by_id(&state.db, credentials.id)
        .await?
        .ok_or_else(invalid)?;
    let token = state.jwt_service().create_token(
        person.id,
        credentials.email.clone().unwrap_or_default(),
        credentials.role.clone(),
    )?;

    let auth_config = state.auth_config();
    let cookie = build_auth_cookie(
        &auth_config.cookie_name,
        &token,
        auth_config.access_token_max_age_secs(),
        &auth_config.cookie_domain,
        auth_config.cookie_secure,
    );

    let mut response = Json(AuthResponse {
        token,
        person: PersonResponse::new(person, credentials.role),
    })
    .into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, header_value(&cookie)?);
    Ok(response)
}

/// Revokes the presented token and clears the auth cookie.
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Response, AppError> {
    if let Some(Extension(claims)) = claims {
        let jti = claims.token_id()?;
        revoked_tokens::revoke(&state.db, jti, claims.expires_at()).await?;
        tracing::info!(person_id = %claims.sub, "Logged out");
    }

    let auth_config = state.auth_config();
    let cookie = build_clear_cookie(
        &auth_config.cookie_name,
        &auth_config.cookie_domain,
        auth_config.cookie_secure,
    );

    let mut response = MessageResponse::new("Logged out").into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, header_value(&cookie)?);
    Ok(response)
}

/// The person behind a valid token.
/// GET /api/auth/verify-token
pub async fn verify_token(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
) -> Result<Json<PersonResponse>, AppError> {
    let claims = authenticated(claims)?;
    let credentials = persons::credentials_by_id(&state.db, claims.person_id()?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Person no longer exists".to_string()))?;
    let person = persons::get_by_id(&state.db, credentials.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Person no longer exists".to_string()))?;

    Ok(Json(PersonResponse::new(person, credentials.role)))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    claims: Option<Extension<Claims>>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let claims = authenticated(claims)?;
    let credentials = persons::credentials_by_id(&state.db, claims.person_id()?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Person no longer exists".to_string()))?;

    let old_ok = credentials
        .password_hash
        .as_deref()
        .is_some_and(|hash| PasswordService::verify_password(&req.old_password, hash));
    if !old_ok {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    PasswordService::validate_strength(&req.new_password)?;
    let password_hash = PasswordService::hash_password(&req.new_password)?;
    persons::set_password_hash(&state.db, credentials.id, &password_hash).await?;

    tracing::info!(person_id = %credentials.id, "Password changed");
    Ok(MessageResponse::new("Password changed"))
}

/// Starts a password reset. The answer is the same whether or not the email is known.
/// POST /api/auth/request-password
pub async fn request_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    if let Some(person) = persons::get_by_email(&state.db, &email).await? {
        let token = generate_token();
        let expires_at = Utc::now()
            + Duration::minutes(state.auth_config().password_reset_expiration_minutes);
        persons::set_password_reset_token(&state.db, &email, &hash_token(&token), expires_at)
            .await?;

        match state.email_service() {
            Some(mailer) => {
                let locale = Locale::from_str_lossy(req.locale.as_deref().unwrap_or("nl"));
                if let Err(e) = mailer
                    .send_password_reset(&email, &person.first_name, &token, locale)
                    .await
                {
                    tracing::error!(person_id = %person.id, "Failed to send password reset email: {e}");
                }
            }
            None => tracing::warn!("Email service not configured; password reset email not sent"),
        }
    }

    Ok(MessageResponse::new(
        "If the email address is known, a reset link has been sent",
    ))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    PasswordService::validate_strength(&req.new_password)?;
    let password_hash = PasswordService::hash_password(&req.new_password)?;

    let person_id = persons::reset_password_with_token(
        &state.db,
        req.email.trim(),
        &hash_token(req.token.trim()),
        &password_hash,
    )
    .await?
    .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    tracing::info!(%person_id, "Password reset");
    Ok(MessageResponse::new("Password has been reset"))
}

/// POST /api/auth/request-confirm-mail
pub async fn request_confirm_mail(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if let Some(person) = persons::get_by_email(&state.db, req.email.trim()).await? {
        let locale = Locale::from_str_lossy(req.locale.as_deref().unwrap_or("nl"));
        send_confirmation(&state, &person, locale).await?;
    }

    Ok(MessageResponse::new(
        "If the email address needs confirming, a confirmation link has been sent",
    ))
}

/// POST /api/auth/confirm-email
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmEmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let person_id = persons::confirm_email(&state.db, &hash_token(req.token.trim()))
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid confirmation token".to_string()))?;

    tracing::info!(%person_id, "Email confirmed");
    Ok(MessageResponse::new("Email confirmed"))
}

/// 409 when the email is taken, 201 when it is free.
/// POST /api/auth/check-email
pub async fn check_email(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<impl IntoResponse, AppError> {
    if persons::email_exists(&state.db, req.email.trim()).await? {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }
    Ok((StatusCode::CREATED, MessageResponse::new("Email is available")))
}

/// Issues a confirmation token for an unconfirmed address and mails it when email is configured.
pub(crate) async fn send_confirmation(
    state: &AppState,
    person: &PersonRow,
    locale: Locale,
) -> Result<(), sqlx::Error> {
    let Some(email) = person.email.as_deref() else {
        return Ok(());
    };
    if person.is_email_confirmed {
        return Ok(());
    }

    let token = generate_token();
    if !persons::set_confirmation_token(&state.db, email, &hash_token(&token)).await? {
        return Ok(());
    }

    match state.email_service() {
        Some(mailer) => {
            if let Err(e) = mailer
                .send_email_confirmation(email, &person.first_name, &token, locale)
                .await
            {
                tracing::error!(person_id = %person.id, "Failed to send confirmation email: {e}");
            }
        }
        None => tracing::warn!("Email service not configured; confirmation email not sent"),
    }
    Ok(())
}

fn authenticated(claims: Option<Extension<Claims>>) -> Result<Claims, AppError> {
    claims
        .map(|Extension(claims)| claims)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn header_value(cookie: &str) -> Result<HeaderValue, AppError> {
    cookie
        .parse()
        .map_err(|_| AppError::Internal("Failed to build cookie header".to_string()))
}
