use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, Statement};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::models::{ManagedAccount, Target};

pub mod kv;
pub mod migrator;
pub mod repositories;

pub use kv::{KvStore, MemoryKvStore, SqliteKvStore};

#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KvStore>,
    conn: Option<sea_orm::DatabaseConnection>,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            kv: Arc::new(SqliteKvStore::new(conn.clone())),
            conn: Some(conn),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Store backed by process memory. Contents are lost on exit.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_kv(Arc::new(MemoryKvStore::new()))
    }

    #[must_use]
    pub fn from_kv(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            conn: None,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Exclusive access for read-modify-write sequences on account records.
    ///
    /// Shared by every clone of this store. Rotations hold it across the
    /// broker call, so account writes wait for an in-flight rotation.
    pub async fn lock_accounts(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub async fn ping(&self) -> Result<()> {
        if let Some(conn) = &self.conn {
            let backend = conn.get_database_backend();
            conn.query_one(Statement::from_string(backend, "SELECT 1".to_string()))
                .await?;
        }
        Ok(())
    }

    fn target_repo(&self) -> repositories::targets::TargetRepository {
        repositories::targets::TargetRepository::new(Arc::clone(&self.kv))
    }

    fn account_repo(&self) -> repositories::accounts::AccountRepository {
        repositories::accounts::AccountRepository::new(Arc::clone(&self.kv))
    }

    pub async fn get_target(&self, name: &str) -> Result<Option<Target>> {
        self.target_repo().get(name).await
    }

    pub async fn put_target(&self, name: &str, target: &Target) -> Result<()> {
        self.target_repo().put(name, target).await
    }

    pub async fn delete_target(&self, name: &str) -> Result<()> {
        self.target_repo().delete(name).await
    }

    pub async fn list_targets(&self) -> Result<Vec<String>> {
        self.target_repo().list().await
    }

    pub async fn get_account(&self, name: &str) -> Result<Option<ManagedAccount>> {
        self.account_repo().get(name).await
    }

    pub async fn put_account(&self, name: &str, account: &ManagedAccount) -> Result<()> {
        self.account_repo().put(name, account).await
    }

    pub async fn delete_account(&self, name: &str) -> Result<()> {
        self.account_repo().delete(name).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<String>> {
        self.account_repo().list().await
    }
}
