use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{AccountService, RotationService, TargetService};
use crate::state::SharedState;

mod accounts;
pub mod auth;
mod error;
mod rotation;
mod system;
mod targets;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn targets(&self) -> &Arc<dyn TargetService> {
        &self.shared.targets
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.accounts
    }

    #[must_use]
    pub fn rotation(&self) -> &Arc<dyn RotationService> {
        &self.shared.rotation
    }
}

#[must_use]
pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared))
}

pub fn router(state: Arc<AppState>) -> Router {
    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(system::health))
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/targets", get(targets::list_targets))
        .route(
            "/targets/{name}",
            get(targets::get_target)
                .put(targets::put_target)
                .delete(targets::delete_target),
        )
        .route("/accounts", get(accounts::list_accounts))
        .route(
            "/accounts/{name}",
            get(accounts::get_account)
                .put(accounts::put_account)
                .delete(accounts::delete_account),
        )
        .route("/creds/{name}", get(accounts::get_credentials))
        .route("/rotate/{name}", post(rotation::rotate_account))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
