use api::auth::tokens::hash_token;
use api::error::AppError;
use api::middleware::jwt::verify;
use api::routes::auth::{
    change_password, check_email, confirm_email, login, logout, register, request_confirm_mail,
    reset_password, ChangePasswordRequest, ConfirmEmailRequest, EmailRequest, LoginRequest,
    RegisterRequest, ResetPasswordRequest,
};
use api::AppState;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{Duration, Utc};

use crate::common::*;

fn register_request(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        first_name: "Ann".to_string(),
        last_name: "Strider".to_string(),
        birth_date: date(1984, 10, 2),
        gender: "V".to_string(),
        iban_number: None,
        club_id: None,
        locale: None,
    }
}

async fn login_token(state: &AppState, email: &str, password: &str) -> Result<String, AppError> {
    let response = login(
        State(state.clone()),
        Json(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }),
    )
    .await?;
    assert!(response.headers().contains_key(SET_COOKIE));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    Ok(json["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_register_then_login() {
    let app_state = setup_test_db().await;
    let email = format!("ann_{}@test.com", unique_suffix());

    let response = register(
        State(app_state.clone()),
        Json(register_request(&email, "longrun42")),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    let duplicate = register(
        State(app_state.clone()),
        Json(register_request(&email.to_uppercase(), "longrun42")),
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let token = login_token(&app_state, &email.to_uppercase(), "longrun42")
        .await
        .unwrap();
    let claims = verify(&app_state, &token).await.unwrap();
    assert_eq!(claims.email, email);

    let wrong = login_token(&app_state, &email, "longrun43").await;
    match wrong {
        Err(AppError::Unauthorized(message)) => {
            assert_eq!(message, "The given user information was incorrect.")
        }
        other => panic!("expected 401, got {:?}", other.map(|_| ())),
    }

    let unknown = login_token(&app_state, "nobody@test.com", "longrun42").await;
    assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app_state = setup_test_db().await;
    let email = format!("weak_{}@test.com", unique_suffix());

    for password in ["short1", "onlyletters"] {
        let result = register(
            State(app_state.clone()),
            Json(register_request(&email, password)),
        )
        .await;
        let error = result.err().expect("weak password accepted");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_check_email() {
    let app_state = setup_test_db().await;
    let (_, claims) = create_test_person(&app_state, "user", date(1990, 1, 1), "M").await;

    let taken = check_email(
        State(app_state.clone()),
        Json(EmailRequest {
            email: claims.email.clone(),
            locale: None,
        }),
    )
    .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    let free = check_email(
        State(app_state.clone()),
        Json(EmailRequest {
            email: format!("free_{}@test.com", unique_suffix()),
            locale: None,
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(free.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app_state = setup_test_db().await;
    let email = format!("out_{}@test.com", unique_suffix());
    register(
        State(app_state.clone()),
        Json(register_request(&email, "longrun42")),
    )
    .await
    .unwrap();

    let token = login_token(&app_state, &email, "longrun42").await.unwrap();
    let claims = verify(&app_state, &token).await.unwrap();

    let response = logout(State(app_state.clone()), Some(Extension(claims)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));

    match verify(&app_state, &token).await {
        Err(AppError::Unauthorized(message)) => assert_eq!(message, "Token has been revoked"),
        other => panic!("revoked token accepted: {:?}", other.map(|c| c.sub)),
    }
}

#[tokio::test]
async fn test_change_and_reset_password() {
    let app_state = setup_test_db().await;
    let email = format!("reset_{}@test.com", unique_suffix());
    register(
        State(app_state.clone()),
        Json(register_request(&email, "longrun42")),
    )
    .await
    .unwrap();
    let token = login_token(&app_state, &email, "longrun42").await.unwrap();
    let claims = verify(&app_state, &token).await.unwrap();

    let wrong_old = change_password(
        State(app_state.clone()),
        Some(Extension(claims.clone())),
        Json(ChangePasswordRequest {
            old_password: "nottheone1".to_string(),
            new_password: "fasterpace7".to_string(),
        }),
    )
    .await;
    assert!(matches!(wrong_old, Err(AppError::BadRequest(_))));

    change_password(
        State(app_state.clone()),
        Some(Extension(claims)),
        Json(ChangePasswordRequest {
            old_password: "longrun42".to_string(),
            new_password: "fasterpace7".to_string(),
        }),
    )
    .await
    .unwrap();
    login_token(&app_state, &email, "fasterpace7").await.unwrap();

    infra::repos::persons::set_password_reset_token(
        &app_state.db,
        &email,
        &hash_token("reset-me"),
        Utc::now() + Duration::minutes(60),
    )
    .await
    .unwrap();

    let reset = |token: &str| ResetPasswordRequest {
        email: email.clone(),
        token: token.to_string(),
        new_password: "marathon26".to_string(),
    };

    let bad = reset_password(State(app_state.clone()), Json(reset("wrong"))).await;
    assert!(matches!(bad, Err(AppError::BadRequest(_))));

    reset_password(State(app_state.clone()), Json(reset("reset-me")))
        .await
        .unwrap();
    login_token(&app_state, &email, "marathon26").await.unwrap();

    // The token is consumed.
    let reused = reset_password(State(app_state.clone()), Json(reset("reset-me"))).await;
    assert!(matches!(reused, Err(AppError::BadRequest(_))));
}

async fn is_confirmed(state: &AppState, email: &str) -> bool {
    sqlx::query_scalar("SELECT is_email_confirmed FROM persons WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_one(&state.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_confirm_email_flow() {
    let app_state = setup_test_db().await;
    let email = format!("confirm_{}@test.com", unique_suffix());
    register(
        State(app_state.clone()),
        Json(register_request(&email, "longrun42")),
    )
    .await
    .unwrap();

    assert!(!is_confirmed(&app_state, &email).await);

    // Unknown addresses get the same answer as known ones.
    for address in [email.to_uppercase(), format!("nobody_{}@test.com", unique_suffix())] {
        request_confirm_mail(
            State(app_state.clone()),
            Json(EmailRequest {
                email: address,
                locale: Some("en".to_string()),
            }),
        )
        .await
        .unwrap();
    }

    infra::repos::persons::set_confirmation_token(&app_state.db, &email, &hash_token("confirm-me"))
        .await
        .unwrap();

    let wrong = confirm_email(
        State(app_state.clone()),
        Json(ConfirmEmailRequest {
            token: "not-the-token".to_string(),
        }),
    )
    .await;
    assert!(matches!(wrong, Err(AppError::BadRequest(_))));

    confirm_email(
        State(app_state.clone()),
        Json(ConfirmEmailRequest {
            token: " confirm-me ".to_string(),
        }),
    )
    .await
    .unwrap();
    assert!(is_confirmed(&app_state, &email).await);

    let reused = confirm_email(
        State(app_state.clone()),
        Json(ConfirmEmailRequest {
            token: "confirm-me".to_string(),
        }),
    )
    .await;
    assert!(matches!(reused, Err(AppError::BadRequest(_))));

    // Confirmed addresses are not issued a new token.
    let issued =
        infra::repos::persons::set_confirmation_token(&app_state.db, &email, &hash_token("again"))
            .await
            .unwrap();
    assert!(!issued);
}

#[tokio::test]
async fn test_admin_election_is_serialized() {
    let app_state = setup_test_db().await;

    let mut first = app_state.db.begin().await.unwrap();
    infra::repos::profiles::lock_admin_election(&mut *first)
        .await
        .unwrap();

    let pool = app_state.db.clone();
    let second = tokio::spawn(async move {
        let mut tx = pool.begin().await.unwrap();
        infra::repos::profiles::lock_admin_election(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();
    });

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert!(!second.is_finished(), "second registration waits for the first");

    first.commit().await.unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(5), second)
        .await
        .unwrap()
        .unwrap();
}
