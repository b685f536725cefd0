use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::auto_rotate::{AutoRotator, TickReport};

pub struct Scheduler {
    rotator: Arc<AutoRotator>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(rotator: Arc<AutoRotator>, config: SchedulerConfig) -> Self {
        Self {
            rotator,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Runs until [`stop`](Self::stop) is called.
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting rotation scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let rotator = Arc::clone(&self.rotator);
        let running = Arc::clone(&self.running);
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let rotator = Arc::clone(&rotator);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_tick(&rotator).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;
        info!("Scheduler running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_secs = self.config.tick_interval_seconds.max(1);
        info!("Scheduler running: sweep every {}s", interval_secs);

        let mut ticker = interval(Duration::from_secs(interval_secs));
        let mut stop_check = interval(Duration::from_secs(1));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                    run_tick(&self.rotator).await;
                }
                _ = stop_check.tick() => {
                    if !*self.running.read().await {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn run_once(&self) -> TickReport {
        info!("Running manual sweep...");
        self.rotator.tick(Utc::now()).await
    }
}

async fn run_tick(rotator: &AutoRotator) -> TickReport {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "rotate_due", "Starting scheduled rotation sweep");

    let report = rotator.tick(Utc::now()).await;
    if !report.failed.is_empty() {
        error!(
            event = "job_failed",
            job_name = "rotate_due",
            failed = ?report.failed,
            "Some scheduled rotations failed"
        );
    }

    info!(
        event = "job_finished",
        job_name = "rotate_due",
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Scheduled rotation sweep finished"
    );
    report
}
