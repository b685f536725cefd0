//! Domain service for broker target configuration.
//!
//! Reads never return the admin password.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TargetView;

/// Fields to create or update a target with. Absent fields keep their stored
/// value on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetUpdate {
    pub semp_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub semp_version: Option<String>,
    pub tls_skip_verify: Option<bool>,
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Target '{0}' not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Target '{target}' is still used by account(s): {}", accounts.join(", "))]
    Conflict {
        target: String,
        accounts: Vec<String>,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for TargetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Domain service trait for targets.
#[async_trait::async_trait]
pub trait TargetService: Send + Sync {
    /// Creates the target, or merges `update` into the existing one.
    async fn upsert(&self, name: &str, update: TargetUpdate) -> Result<TargetView, TargetError>;

    async fn get(&self, name: &str) -> Result<TargetView, TargetError>;

    /// Lists target names in lexicographic order.
    async fn list(&self) -> Result<Vec<String>, TargetError>;

    /// Deletes the target. Refused while any account references it.
    async fn delete(&self, name: &str) -> Result<(), TargetError>;
}
