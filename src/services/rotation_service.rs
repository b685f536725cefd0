//! Domain service for password rotation.
//!
//! Rotation is the only path that writes an account's password and
//! `last_rotated` fields.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by [`RotationService::rotate`].
///
/// `Display` output is safe to show to callers. Broker-supplied diagnostics
/// are only ever written to the log.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Account '{account}' was rotated too recently; retry in {retry_after_secs}s")]
    RateLimited {
        account: String,
        retry_after_secs: i64,
    },

    #[error("Could not reach target '{target}' to rotate account '{account}'")]
    Transport { account: String, target: String },

    #[error("Target '{target}' did not accept the new password for account '{account}'")]
    Protocol { account: String, target: String },

    #[error(
        "Password for account '{account}' was changed on target '{target}' but could not be stored; manual recovery required"
    )]
    ManualRecoveryRequired { account: String, target: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl RotationError {
    pub fn account_not_found(name: &str) -> Self {
        Self::NotFound(format!("Account '{name}' not found"))
    }

    pub fn target_not_found(target: &str, account: &str) -> Self {
        Self::NotFound(format!("Target '{target}' not found for account '{account}'"))
    }

    /// Whether the next scheduler tick may reasonably try again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::ManualRecoveryRequired { .. })
    }
}

/// Result of a successful rotation.
#[derive(Debug, Clone, Serialize)]
pub struct RotationOutcome {
    pub account: String,
    pub target: String,
    pub last_rotated: DateTime<Utc>,
}

/// Domain service trait for rotation.
#[async_trait::async_trait]
pub trait RotationService: Send + Sync {
    /// Rotates the password of `account` on its target and stores it.
    ///
    /// # Errors
    ///
    /// Errors leave the stored record untouched. Apart from
    /// [`RotationError::ManualRecoveryRequired`], they also mean the target
    /// still has the previous password; with that variant the target already
    /// holds a password the store does not.
    async fn rotate(&self, account: &str) -> Result<RotationOutcome, RotationError>;
}
