use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, DeletedResponse};
use crate::models::TargetView;
use crate::services::TargetUpdate;

/// `GET /api/targets`
pub async fn list_targets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let names = state.targets().list().await?;
    Ok(Json(ApiResponse::success(names)))
}

/// `GET /api/targets/{name}`
pub async fn get_target(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<TargetView>>, ApiError> {
    let view = state.targets().get(&name).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `PUT /api/targets/{name}`
///
/// Creates the target or merges the supplied fields into it.
pub async fn put_target(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<TargetUpdate>,
) -> Result<Json<ApiResponse<TargetView>>, ApiError> {
    let view = state.targets().upsert(&name, payload).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `DELETE /api/targets/{name}`
pub async fn delete_target(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state.targets().delete(&name).await?;
    Ok(Json(ApiResponse::success(DeletedResponse { deleted: name })))
}
