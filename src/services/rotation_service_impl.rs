//! Store-backed implementation of the `RotationService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clients::PasswordChanger;
use crate::db::Store;
use crate::services::password::generate_password;
use crate::services::rotation_service::{RotationError, RotationOutcome, RotationService};

/// Serializes every rotation in the process behind the store's account lock.
///
/// The lock spans the store read, the broker call and the store write, so a
/// broker that hangs until the request timeout holds up all other rotations
/// and account writes for that long.
pub struct StoreRotationService {
    store: Store,
    changer: Arc<dyn PasswordChanger>,
}

impl StoreRotationService {
    #[must_use]
    pub fn new(store: Store, changer: Arc<dyn PasswordChanger>) -> Self {
        Self { store, changer }
    }
}

#[async_trait]
impl RotationService for StoreRotationService {
    async fn rotate(&self, name: &str) -> Result<RotationOutcome, RotationError> {
        let _guard = self.store.lock_accounts().await;

        let mut account = self
            .store
            .get_account(name)
            .await
            .map_err(|e| {
                error!(event = "rotation_failed", account = name, error = %e, "Failed to load account");
                RotationError::Storage("failed to load account".to_string())
            })?
            .ok_or_else(|| RotationError::account_not_found(name))?;

        if let Some(remaining) = account.cooldown_remaining(Utc::now()) {
            let retry_after_secs = remaining.num_seconds().max(1);
            warn!(
                event = "rotation_rate_limited",
                account = name,
                retry_after_secs,
                "Rotation requested before cooldown elapsed"
            );
            return Err(RotationError::RateLimited {
                account: name.to_string(),
                retry_after_secs,
            });
        }

        let target = self
            .store
            .get_target(&account.target)
            .await
            .map_err(|e| {
                error!(
                    event = "rotation_failed",
                    account = name,
                    target = %account.target,
                    error = %e,
                    "Failed to load target"
                );
                RotationError::Storage("failed to load target".to_string())
            })?
            .ok_or_else(|| RotationError::target_not_found(&account.target, name))?;

        let new_password = generate_password(account.effective_password_length())
            .map_err(|e| RotationError::Validation(e.to_string()))?;

        if let Err(e) = self
            .changer
            .change_password(&target, &account.remote_username, &new_password)
            .await
        {
            error!(
                event = "rotation_failed",
                account = name,
                remote_username = %account.remote_username,
                target = %account.target,
                error = %e,
                "SEMP password change failed"
            );
            let (account, target) = (name.to_string(), account.target);
            return Err(if e.is_transport() {
                RotationError::Transport { account, target }
            } else {
                RotationError::Protocol { account, target }
            });
        }

        let rotated_at = Utc::now();
        account.password = Some(new_password.clone());
        account.last_rotated = Some(rotated_at);

        if let Err(e) = self.store.put_account(name, &account).await {
            error!(
                event = "rotation_persist_failed",
                severity = "critical",
                account = name,
                remote_username = %account.remote_username,
                target = %account.target,
                new_password = %new_password,
                error = %e,
                "Password changed on target but failed to store it; manual recovery required"
            );
            return Err(RotationError::ManualRecoveryRequired {
                account: name.to_string(),
                target: account.target,
            });
        }

        info!(
            event = "rotation_succeeded",
            account = name,
            remote_username = %account.remote_username,
            target = %account.target,
            "Password rotated"
        );

        Ok(RotationOutcome {
            account: name.to_string(),
            target: account.target,
            last_rotated: rotated_at,
        })
    }
}
