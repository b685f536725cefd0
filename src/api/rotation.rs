use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::RotationOutcome;

/// `POST /api/rotate/{name}`
///
/// Rotates the account immediately. The new password is not returned; read it
/// from `/api/creds/{name}`.
pub async fn rotate_account(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<RotationOutcome>>, ApiError> {
    let outcome = state.rotation().rotate(&name).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
