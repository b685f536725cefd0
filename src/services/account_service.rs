//! Domain service for managed account configuration and credential reads.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AccountView, Credentials};

/// Fields to create or update an account with. Absent fields keep their
/// stored value on update. The password and rotation timestamp are never
/// settable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    pub target: Option<String>,
    pub remote_username: Option<String>,
    pub rotation_period_secs: Option<u64>,
    pub password_length: Option<usize>,
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account '{0}' not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account '{0}' has not been rotated yet")]
    NotYetRotated(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AccountError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Domain service trait for managed accounts.
#[async_trait::async_trait]
pub trait AccountService: Send + Sync {
    /// Creates the account, or merges `update` into the existing one.
    async fn upsert(&self, name: &str, update: AccountUpdate)
    -> Result<AccountView, AccountError>;

    async fn get(&self, name: &str) -> Result<AccountView, AccountError>;

    /// Lists account names in lexicographic order.
    async fn list(&self) -> Result<Vec<String>, AccountError>;

    async fn delete(&self, name: &str) -> Result<(), AccountError>;

    /// Returns the current credentials. Never triggers a rotation.
    async fn read_credentials(&self, name: &str) -> Result<Credentials, AccountError>;
}
