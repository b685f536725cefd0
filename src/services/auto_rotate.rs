use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::db::Store;
use crate::services::rotation_service::RotationService;

/// Summary of one sweep over all accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub scanned: usize,
    pub due: usize,
    pub rotated: Vec<String>,
    pub failed: Vec<String>,
}

pub struct AutoRotator {
    store: Store,
    rotation: Arc<dyn RotationService>,
}

impl AutoRotator {
    #[must_use]
    pub fn new(store: Store, rotation: Arc<dyn RotationService>) -> Self {
        Self { store, rotation }
    }

    /// Rotates every account that is due at `now`.
    ///
    /// Failures are logged per account and never abort the sweep.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let start = std::time::Instant::now();
        let mut report = TickReport::default();

        let names = match self.store.list_accounts().await {
            Ok(names) => names,
            Err(e) => {
                error!(event = "tick_failed", error = %e, "Failed to list accounts");
                return report;
            }
        };

        for name in names {
            report.scanned += 1;

            let account = match self.store.get_account(&name).await {
                Ok(Some(account)) => account,
                Ok(None) => continue,
                Err(e) => {
                    warn!(account = %name, error = %e, "Failed to load account during tick");
                    report.failed.push(name);
                    continue;
                }
            };

            if !account.is_due(now) {
                debug!(account = %name, "Account not due");
                continue;
            }
            report.due += 1;

            match self.rotation.rotate(&name).await {
                Ok(_) => report.rotated.push(name),
                Err(e) => {
                    warn!(
                        event = "scheduled_rotation_failed",
                        account = %name,
                        retryable = e.is_retryable(),
                        error = %e,
                        "Scheduled rotation failed"
                    );
                    report.failed.push(name);
                }
            }
        }

        info!(
            event = "tick_finished",
            scanned = report.scanned,
            due = report.due,
            rotated = report.rotated.len(),
            failed = report.failed.len(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Rotation sweep complete"
        );

        report
    }
}
