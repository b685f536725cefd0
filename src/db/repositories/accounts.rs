use anyhow::Result;
use std::sync::Arc;

use super::{get_entry, put_entry};
use crate::constants::storage::ACCOUNT_PREFIX;
use crate::db::kv::KvStore;
use crate::models::ManagedAccount;

pub struct AccountRepository {
    kv: Arc<dyn KvStore>,
}

impl AccountRepository {
    #[must_use]
    pub const fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(name: &str) -> String {
        format!("{ACCOUNT_PREFIX}{name}")
    }

    pub async fn get(&self, name: &str) -> Result<Option<ManagedAccount>> {
        get_entry(self.kv.as_ref(), &Self::key(name)).await
    }

    /// Writes the whole record in one store operation.
    pub async fn put(&self, name: &str, account: &ManagedAccount) -> Result<()> {
        put_entry(self.kv.as_ref(), &Self::key(name), account).await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.kv.delete(&Self::key(name)).await
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.kv.list(ACCOUNT_PREFIX).await
    }
}
