//! Store-backed implementation of the `TargetService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::models::{Target, TargetView};
use crate::services::target_service::{TargetError, TargetService, TargetUpdate};
use crate::services::validation::validate_name;

pub struct StoreTargetService {
    store: Store,
}

impl StoreTargetService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn merge(mut target: Target, update: TargetUpdate) -> Target {
        if let Some(url) = update.semp_url {
            target.semp_url = url.trim().to_string();
        }
        if let Some(username) = update.admin_username {
            target.admin_username = username;
        }
        if let Some(password) = update.admin_password {
            target.admin_password = password;
        }
        if let Some(version) = update.semp_version {
            let version = version.trim();
            target.semp_version = (!version.is_empty()).then(|| version.to_string());
        }
        if let Some(skip) = update.tls_skip_verify {
            target.tls_skip_verify = skip;
        }
        target
    }

    fn validate(target: &Target) -> Result<(), TargetError> {
        if target.semp_url.is_empty() {
            return Err(TargetError::Validation("semp_url is required".to_string()));
        }

        let url = url::Url::parse(&target.semp_url)
            .map_err(|e| TargetError::Validation(format!("Invalid semp_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TargetError::Validation(format!(
                "semp_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::Validation(
                "semp_url must include a host".to_string(),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(TargetError::Validation(
                "semp_url must not include a query or fragment".to_string(),
            ));
        }

        if target.admin_username.trim().is_empty() {
            return Err(TargetError::Validation(
                "admin_username is required".to_string(),
            ));
        }
        if target.admin_password.is_empty() {
            return Err(TargetError::Validation(
                "admin_password is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl TargetService for StoreTargetService {
    async fn upsert(&self, name: &str, update: TargetUpdate) -> Result<TargetView, TargetError> {
        validate_name("Target", name).map_err(TargetError::Validation)?;

        let existing = self.store.get_target(name).await?;
        let created = existing.is_none();
        let target = Self::merge(existing.unwrap_or_default(), update);
        Self::validate(&target)?;

        self.store.put_target(name, &target).await?;
        info!(
            event = if created { "target_created" } else { "target_updated" },
            target = name,
            semp_url = %target.semp_url,
            "Target saved"
        );

        Ok(TargetView::new(name, &target))
    }

    async fn get(&self, name: &str) -> Result<TargetView, TargetError> {
        self.store
            .get_target(name)
            .await?
            .map(|target| TargetView::new(name, &target))
            .ok_or_else(|| TargetError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, TargetError> {
        Ok(self.store.list_targets().await?)
    }

    async fn delete(&self, name: &str) -> Result<(), TargetError> {
        let _guard = self.store.lock_accounts().await;
        if self.store.get_target(name).await?.is_none() {
            return Err(TargetError::NotFound(name.to_string()));
        }

        let mut accounts = Vec::new();
        for account_name in self.store.list_accounts().await? {
            if let Some(account) = self.store.get_account(&account_name).await?
                && account.target == name
            {
                accounts.push(account_name);
            }
        }
        if !accounts.is_empty() {
            return Err(TargetError::Conflict {
                target: name.to_string(),
                accounts,
            });
        }

        self.store.delete_target(name).await?;
        info!(event = "target_deleted", target = name, "Target deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManagedAccount;

    fn full_update() -> TargetUpdate {
        TargetUpdate {
            semp_url: Some("https://broker.local:943".to_string()),
            admin_username: Some("admin".to_string()),
            admin_password: Some("adminpass".to_string()),
            semp_version: Some("soltr/10_4".to_string()),
            tls_skip_verify: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_read_redacted() {
        let store = Store::in_memory();
        let service = StoreTargetService::new(store.clone());

        let view = service.upsert("b1", full_update()).await.unwrap();

        assert_eq!(view.semp_url, "https://broker.local:943");
        assert_eq!(service.get("b1").await.unwrap(), view);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("adminpass"));
        assert_eq!(
            store.get_target("b1").await.unwrap().unwrap().admin_password,
            "adminpass"
        );
    }

    #[tokio::test]
    async fn test_update_merges_supplied_fields() {
        let store = Store::in_memory();
        let service = StoreTargetService::new(store.clone());
        service.upsert("b1", full_update()).await.unwrap();

        service
            .upsert(
                "b1",
                TargetUpdate {
                    tls_skip_verify: Some(true),
                    semp_version: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = store.get_target("b1").await.unwrap().unwrap();
        assert!(stored.tls_skip_verify);
        assert_eq!(stored.semp_version, None);
        assert_eq!(stored.admin_password, "adminpass");
        assert_eq!(stored.semp_url, "https://broker.local:943");
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let service = StoreTargetService::new(Store::in_memory());

        let missing_password = TargetUpdate {
            admin_password: None,
            ..full_update()
        };
        assert!(matches!(
            service.upsert("b1", missing_password).await,
            Err(TargetError::Validation(_))
        ));

        let missing_user = TargetUpdate {
            admin_username: Some("  ".to_string()),
            ..full_update()
        };
        assert!(matches!(
            service.upsert("b1", missing_user).await,
            Err(TargetError::Validation(_))
        ));

        assert!(matches!(
            service.get("b1").await,
            Err(TargetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_url_validation() {
        let service = StoreTargetService::new(Store::in_memory());

        for bad in [
            "ftp://broker",
            "not a url",
            "http://",
            "",
            "https://broker/x?a=1",
            "https://broker:943#top",
        ] {
            let update = TargetUpdate {
                semp_url: Some(bad.to_string()),
                ..full_update()
            };
            assert!(
                matches!(
                    service.upsert("b1", update).await,
                    Err(TargetError::Validation(_))
                ),
                "accepted {bad:?}"
            );
        }

        let plain_http = TargetUpdate {
            semp_url: Some("http://10.0.0.5:8080/".to_string()),
            ..full_update()
        };
        assert!(service.upsert("b1", plain_http).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let store = Store::in_memory();
        let service = StoreTargetService::new(store.clone());
        service.upsert("b1", full_update()).await.unwrap();
        store
            .put_account(
                "reader",
                &ManagedAccount {
                    target: "b1".to_string(),
                    remote_username: "reader".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = service.delete("b1").await.unwrap_err();
        assert!(matches!(err, TargetError::Conflict { ref accounts, .. } if accounts == &["reader"]));

        store.delete_account("reader").await.unwrap();
        service.delete("b1").await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
        assert!(matches!(
            service.delete("b1").await,
            Err(TargetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_name_rejected() {
        let service = StoreTargetService::new(Store::in_memory());
        assert!(matches!(
            service.upsert("a/b", full_update()).await,
            Err(TargetError::Validation(_))
        ));
    }
}
