use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use async_graphql::{ObjectType, Schema, SubscriptionType};
use async_graphql_axum::{GraphQLProtocol, GraphQLWebSocket};
use axum::{
    extract::{DefaultBodyLimit, Request, State, WebSocketUpgrade},
    http::{
        header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::Claims;
use crate::error::AppError;
use crate::middleware::jwt::{jwt_middleware, verify};
use crate::middleware::security_headers;
use crate::routes::{auth, uploads};
use crate::state::AppState;

const GRAPHQL_BODY_LIMIT: usize = 2 * 1024 * 1024;
const UPLOAD_BODY_OVERHEAD: usize = 64 * 1024;

/// Build the Axum router with health endpoint, REST auth, uploads and GraphQL.
pub fn build_router<Q, M, S>(
    state: AppState,
    schema: Schema<Q, M, S>,
    allowed_origins: &[String],
) -> anyhow::Result<Router>
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    // Rate limiting: about 10 requests per minute per IP on credential endpoints
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .finish()
        .context("invalid rate limiter configuration")?;

    let rate_limited_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/request-password", post(auth::request_password))
        .route("/api/auth/request-confirm-mail", post(auth::request_confirm_mail))
        .layer(GovernorLayer::new(Arc::new(governor_conf)));

    let upload_limit = state.upload_config().max_bytes + UPLOAD_BODY_OVERHEAD;
    let upload_dir = state.upload_config().dir.clone();
    let public_upload_path = public_path(&state.upload_config().public_base_url);
    let hsts = state.auth_config().cookie_secure;

    let router = Router::new()
        // Liveness check; also proves DB connectivity.
        .route("/health", get(health))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/verify-token", get(auth::verify_token))
        .route("/api/auth/change-password", post(auth::change_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/confirm-email", post(auth::confirm_email))
        .route("/api/auth/check-email", post(auth::check_email))
        .merge(rate_limited_routes)
        .route(
            "/api/clubs/{id}/logo",
            post(uploads::upload_club_logo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // GraphQL endpoint with custom handler that includes JWT claims in context
        .route(
            "/graphql",
            post({
                let schema_clone = schema.clone();
                move |state, req| graphql_handler(state, req, schema_clone)
            })
            .get({
                let schema_clone = schema.clone();
                move |state, claims, protocol, upgrade| {
                    graphql_ws_handler(state, claims, protocol, upgrade, schema_clone)
                }
            }),
        )
        .nest_service(&public_upload_path, ServeDir::new(upload_dir))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, jwt_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer({
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
                .allow_credentials(true)
        });

    Ok(security_headers::apply(router, hsts))
}

/// The path part of the public upload URL, used to mount the static file service.
fn public_path(public_base_url: &str) -> String {
    let without_scheme = public_base_url
        .split_once("://")
        .map(|(_, rest)| rest.find('/').map_or("", |i| &rest[i..]))
        .unwrap_or(public_base_url);
    let path = without_scheme.trim_end_matches('/');
    if path.is_empty() {
        "/uploads".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// GraphQL handler that forwards the JWT claims from the request extensions
/// into the GraphQL context.
async fn graphql_handler<Q, M, S>(
    State(state): State<AppState>,
    req: Request,
    schema: Schema<Q, M, S>,
) -> Result<Response, AppError>
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let claims = req.extensions().get::<Claims>().cloned();

    let (_parts, body) = req.into_parts();
    let body_bytes = axum::body::to_bytes(body, GRAPHQL_BODY_LIMIT)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;

    let gql_request: async_graphql::Request = serde_json::from_slice(&body_bytes)
        .map_err(|e| AppError::BadRequest(format!("Invalid GraphQL request: {}", e)))?;

    let mut gql_request = gql_request.data(state);
    if let Some(claims) = claims {
        gql_request = gql_request.data(claims);
    }

    let gql_response = schema.execute(gql_request).await;

    Ok(Json(gql_response).into_response())
}

/// WebSocket handler for GraphQL subscriptions.
///
/// A token in the `connection_init` payload (`{ headers: { Authorization: "Bearer …" } }`)
/// takes precedence over the cookie seen on the upgrade request.
async fn graphql_ws_handler<Q, M, S>(
    State(state): State<AppState>,
    cookie_claims: Option<Extension<Claims>>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
    schema: Schema<Q, M, S>,
) -> Response
where
    Q: ObjectType + Send + Sync + 'static,
    M: ObjectType + Send + Sync + 'static,
    S: SubscriptionType + Send + Sync + 'static,
{
    let cookie_claims = cookie_claims.map(|Extension(claims)| claims);

    upgrade
        .protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |value: serde_json::Value| async move {
                    let mut data = async_graphql::Data::default();

                    let token = value
                        .get("headers")
                        .and_then(|h| h.get("Authorization"))
                        .and_then(|v| v.as_str())
                        .and_then(|s| s.strip_prefix("Bearer "));

                    if let Some(token) = token {
                        match verify(&state, token).await {
                            Ok(claims) => {
                                data.insert(claims);
                            }
                            Err(_) => {
                                return Err(async_graphql::Error::new(
                                    "Invalid or expired token",
                                ));
                            }
                        }
                    } else if let Some(claims) = cookie_claims {
                        data.insert(claims);
                    }

                    Ok(data)
                })
                .serve()
        })
}

/// Liveness + quick DB check.
async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    let _one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&state.db).await?;
    Ok("ok")
}
