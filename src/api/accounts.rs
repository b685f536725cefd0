use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, DeletedResponse};
use crate::models::{AccountView, Credentials};
use crate::services::AccountUpdate;

/// `GET /api/accounts`
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let names = state.accounts().list().await?;
    Ok(Json(ApiResponse::success(names)))
}

/// `GET /api/accounts/{name}`
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<AccountView>>, ApiError> {
    let view = state.accounts().get(&name).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `PUT /api/accounts/{name}`
pub async fn put_account(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<ApiResponse<AccountView>>, ApiError> {
    let view = state.accounts().upsert(&name, payload).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `DELETE /api/accounts/{name}`
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    state.accounts().delete(&name).await?;
    Ok(Json(ApiResponse::success(DeletedResponse { deleted: name })))
}

/// `GET /api/creds/{name}`
pub async fn get_credentials(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Credentials>>, ApiError> {
    let creds = state.accounts().read_credentials(&name).await?;
    Ok(Json(ApiResponse::success(creds)))
}
