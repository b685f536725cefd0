use std::sync::Arc;

use crate::clients::{PasswordChanger, SempClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AccountService, AutoRotator, RotationService, StoreAccountService, StoreRotationService,
    StoreTargetService, TargetService,
};

/// Services shared by the CLI, the scheduler and the HTTP API.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub targets: Arc<dyn TargetService>,

    pub accounts: Arc<dyn AccountService>,

    pub rotation: Arc<dyn RotationService>,

    pub auto_rotator: Arc<AutoRotator>,
}

impl SharedState {
    /// Opens the configured database and wires up the SEMP client.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::new(&config.general.database_path).await?;
        let changer = Arc::new(SempClient::new(&config.semp));
        Ok(Self::with_parts(config, store, changer))
    }

    /// Builds the state from an existing store and password changer.
    #[must_use]
    pub fn with_parts(config: Config, store: Store, changer: Arc<dyn PasswordChanger>) -> Self {
        let rotation = Arc::new(StoreRotationService::new(store.clone(), changer))
            as Arc<dyn RotationService>;
        let auto_rotator = Arc::new(AutoRotator::new(store.clone(), rotation.clone()));

        Self {
            config: Arc::new(config),
            targets: Arc::new(StoreTargetService::new(store.clone())),
            accounts: Arc::new(StoreAccountService::new(store.clone())),
            rotation,
            auto_rotator,
            store,
        }
    }
}
