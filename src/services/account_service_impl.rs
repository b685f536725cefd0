//! Store-backed implementation of the `AccountService` trait.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::Store;
use crate::models::{AccountView, Credentials, ManagedAccount};
use crate::services::account_service::{AccountError, AccountService, AccountUpdate};
use crate::services::password::validate_length;
use crate::services::validation::validate_name;

pub struct StoreAccountService {
    store: Store,
}

impl StoreAccountService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn merge(mut account: ManagedAccount, update: AccountUpdate) -> ManagedAccount {
        if let Some(target) = update.target {
            account.target = target;
        }
        if let Some(username) = update.remote_username {
            account.remote_username = username.trim().to_string();
        }
        if let Some(period) = update.rotation_period_secs {
            account.rotation_period_secs = period;
        }
        if let Some(length) = update.password_length {
            account.password_length = Some(length);
        }
        account
    }

    async fn validate(&self, account: &ManagedAccount) -> Result<(), AccountError> {
        if account.target.is_empty() {
            return Err(AccountError::Validation("target is required".to_string()));
        }
        if self.store.get_target(&account.target).await?.is_none() {
            return Err(AccountError::Validation(format!(
                "Target '{}' does not exist",
                account.target
            )));
        }

        if account.remote_username.is_empty() {
            return Err(AccountError::Validation(
                "remote_username is required".to_string(),
            ));
        }

        if let Some(length) = account.password_length {
            validate_length(length).map_err(|e| AccountError::Validation(e.to_string()))?;
        }

        Ok(())
    }
}

#[async_trait]
impl AccountService for StoreAccountService {
    async fn upsert(
        &self,
        name: &str,
        update: AccountUpdate,
    ) -> Result<AccountView, AccountError> {
        validate_name("Account", name).map_err(AccountError::Validation)?;

        let _guard = self.store.lock_accounts().await;
        let existing = self.store.get_account(name).await?;
        let created = existing.is_none();
        let account = Self::merge(existing.unwrap_or_default(), update);
        self.validate(&account).await?;

        self.store.put_account(name, &account).await?;
        info!(
            event = if created { "account_created" } else { "account_updated" },
            account = name,
            target = %account.target,
            remote_username = %account.remote_username,
            rotation_period_secs = account.rotation_period_secs,
            "Account saved"
        );

        Ok(AccountView::new(name, &account))
    }

    async fn get(&self, name: &str) -> Result<AccountView, AccountError> {
        self.store
            .get_account(name)
            .await?
            .map(|account| AccountView::new(name, &account))
            .ok_or_else(|| AccountError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, AccountError> {
        Ok(self.store.list_accounts().await?)
    }

    async fn delete(&self, name: &str) -> Result<(), AccountError> {
        let _guard = self.store.lock_accounts().await;
        if self.store.get_account(name).await?.is_none() {
            return Err(AccountError::NotFound(name.to_string()));
        }
        self.store.delete_account(name).await?;
        info!(event = "account_deleted", account = name, "Account deleted");
        Ok(())
    }

    async fn read_credentials(&self, name: &str) -> Result<Credentials, AccountError> {
        let account = self
            .store
            .get_account(name)
            .await?
            .ok_or_else(|| AccountError::NotFound(name.to_string()))?;

        let (Some(password), Some(last_rotated)) = (account.password, account.last_rotated)
        else {
            return Err(AccountError::NotYetRotated(name.to_string()));
        };

        debug!(event = "credentials_read", account = name, "Credentials read");
        Ok(Credentials {
            remote_username: account.remote_username,
            password,
            target: account.target,
            last_rotated,
        })
    }
}
