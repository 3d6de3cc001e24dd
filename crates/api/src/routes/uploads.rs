use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::AppError;
use crate::gql::types::Role;
use crate::services::blob_store::unique_blob_name;
use crate::state::AppState;
use infra::models::ClubRow;
use infra::repos::{clubs, profiles};

/// Club logo upload (multipart field `file`, admin only)
/// POST /api/clubs/{id}/logo
pub async fn upload_club_logo(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    claims: Option<Extension<Claims>>,
    mut multipart: Multipart,
) -> Result<Json<ClubRow>, AppError> {
    require_admin(&state, claims).await?;

    if clubs::get_by_id(&state.db, club_id).await?.is_none() {
        return Err(AppError::NotFound("Club not found".to_string()));
    }

    let max_bytes = state.upload_config().max_bytes;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let Some(extension) = image_extension(&content_type) else {
            return Err(AppError::BadRequest(
                "Only PNG, JPEG, WebP or GIF images can be uploaded".to_string(),
            ));
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::BadRequest(format!(
                "File is too large (maximum {} bytes)",
                max_bytes
            )));
        }

        // The stored suffix follows the checked type, never the client's file name.
        let name = unique_blob_name(&format!("logo.{extension}"));
        let url = state
            .blob_store()
            .put(&name, &content_type, bytes.to_vec())
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let club = clubs::set_logo(&state.db, club_id, &url)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;
        tracing::info!(%club_id, %url, "Club logo uploaded");
        return Ok(Json(club));
    }

    Err(AppError::BadRequest("Missing file field".to_string()))
}

async fn require_admin(state: &AppState, claims: Option<Extension<Claims>>) -> Result<(), AppError> {
    let Extension(claims) =
        claims.ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let profile = profiles::get_by_person(&state.db, claims.person_id()?).await?;
    let role = profile.map(|p| Role::from(p.role)).unwrap_or(Role::User);
    if role != Role::Admin {
        return Err(AppError::Forbidden(
            "Administrator privileges required".to_string(),
        ));
    }
    Ok(())
}

/// Raster formats that are safe to serve back from the upload directory.
fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}
