pub mod accounts;
pub mod targets;

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

use super::kv::KvStore;

async fn get_entry<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Result<Option<T>> {
    let Some(bytes) = kv.get(key).await? else {
        return Ok(None);
    };

    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Corrupt record at {key}"))?;

    Ok(Some(value))
}

async fn put_entry<T: Serialize>(kv: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec(value)?;
    kv.put(key, bytes).await
}
