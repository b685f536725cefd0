//! Keyed byte storage underneath the repositories.
//!
//! Single-key writes are atomic. Nothing above this layer assumes multi-key
//! transactions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::entities::{kv_entries, prelude::*};

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns the key suffixes stored under `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

pub struct SqliteKvStore {
    conn: DatabaseConnection,
}

impl SqliteKvStore {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row = KvEntries::find_by_id(key.to_string())
            .one(&self.conn)
            .await
            .with_context(|| format!("Failed to read key {key}"))?;

        Ok(row.map(|m| m.value))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let active_model = kv_entries::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        KvEntries::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(kv_entries::Column::Key)
                    .update_columns([kv_entries::Column::Value, kv_entries::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to write key {key}"))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        KvEntries::delete_by_id(key.to_string())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete key {key}"))?;

        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // LIKE is case-insensitive and treats `_` as a wildcard in SQLite,
        // so the prefix match is re-checked below.
        let keys: Vec<String> = KvEntries::find()
            .select_only()
            .column(kv_entries::Column::Key)
            .filter(kv_entries::Column::Key.starts_with(prefix))
            .order_by_asc(kv_entries::Column::Key)
            .into_tuple()
            .all(&self.conn)
            .await
            .with_context(|| format!("Failed to list keys under {prefix}"))?;

        Ok(keys
            .iter()
            .filter_map(|k| k.strip_prefix(prefix))
            .map(str::to_string)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .read()
            .await
            .range(prefix.to_string()..)
            .map_while(|(k, _)| k.strip_prefix(prefix))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic_ops() {
        let store = MemoryKvStore::new();

        assert!(store.get("a/1").await.unwrap().is_none());

        store.put("a/1", b"one".to_vec()).await.unwrap();
        store.put("a/2", b"two".to_vec()).await.unwrap();
        store.put("b/1", b"other".to_vec()).await.unwrap();

        assert_eq!(store.get("a/1").await.unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.list("a/").await.unwrap(), vec!["1", "2"]);

        store.put("a/1", b"uno".to_vec()).await.unwrap();
        assert_eq!(store.get("a/1").await.unwrap(), Some(b"uno".to_vec()));

        store.delete("a/1").await.unwrap();
        assert!(store.get("a/1").await.unwrap().is_none());
        assert_eq!(store.list("a/").await.unwrap(), vec!["2"]);
    }

    #[tokio::test]
    async fn test_memory_store_list_respects_prefix_boundary() {
        let store = MemoryKvStore::new();
        store.put("accounts/x", vec![]).await.unwrap();
        store.put("accountsx", vec![]).await.unwrap();
        store.put("config/targets/b", vec![]).await.unwrap();

        assert_eq!(store.list("accounts/").await.unwrap(), vec!["x"]);
        assert!(store.list("missing/").await.unwrap().is_empty());
    }
}
