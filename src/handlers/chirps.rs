use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Chirp;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ChirpService;

#[derive(Debug, Deserialize)]
pub struct ChirpPayload {
    pub message: String,
}

/// GET /chirps - Public listing, ordered by creation time
pub async fn list() -> ApiResult<Vec<Chirp>> {
    let service = ChirpService::from_manager().await?;
    let chirps = service.list().await?;
    Ok(ApiResponse::success(chirps))
}

/// POST /chirps - Create a chirp owned by the authenticated user
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChirpPayload>,
) -> ApiResult<Chirp> {
    let service = ChirpService::from_manager().await?;
    let chirp = service.create(user.user_id, &payload.message).await?;

    tracing::debug!(chirp_id = %chirp.id, user = %user.name, "created chirp");
    Ok(ApiResponse::created(chirp))
}

/// GET /chirps/:id - Fetch a single chirp for its owner's edit view
pub async fn show(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Chirp> {
    let chirp_id = parse_chirp_id(&id)?;

    let service = ChirpService::from_manager().await?;
    let chirp = service.get_for_edit(chirp_id, user.user_id).await?;
    Ok(ApiResponse::success(chirp))
}

/// PUT /chirps/:id - Replace the message of an owned chirp
pub async fn update(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChirpPayload>,
) -> ApiResult<Chirp> {
    let chirp_id = parse_chirp_id(&id)?;

    let service = ChirpService::from_manager().await?;
    let chirp = service
        .update(chirp_id, user.user_id, &payload.message)
        .await?;
    Ok(ApiResponse::success(chirp))
}

/// DELETE /chirps/:id - Permanently remove an owned chirp
pub async fn delete(
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let chirp_id = parse_chirp_id(&id)?;

    let service = ChirpService::from_manager().await?;
    service.delete(chirp_id, user.user_id).await?;

    Ok(ApiResponse::success(json!({ "deleted": chirp_id })))
}

/// A path id that is not a UUID cannot name any chirp, so it reads as 404
/// rather than a malformed request.
fn parse_chirp_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(format!("chirp {} not found", raw)))
}
