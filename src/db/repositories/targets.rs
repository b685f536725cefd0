use anyhow::Result;
use std::sync::Arc;

use super::{get_entry, put_entry};
use crate::constants::storage::TARGET_PREFIX;
use crate::db::kv::KvStore;
use crate::models::Target;

pub struct TargetRepository {
    kv: Arc<dyn KvStore>,
}

impl TargetRepository {
    #[must_use]
    pub const fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn key(name: &str) -> String {
        format!("{TARGET_PREFIX}{name}")
    }

    pub async fn get(&self, name: &str) -> Result<Option<Target>> {
        get_entry(self.kv.as_ref(), &Self::key(name)).await
    }

    pub async fn put(&self, name: &str, target: &Target) -> Result<()> {
        put_entry(self.kv.as_ref(), &Self::key(name), target).await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        self.kv.delete(&Self::key(name)).await
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        self.kv.list(TARGET_PREFIX).await
    }
}
