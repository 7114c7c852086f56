//! Schedule command handler
//!
//! Registers the alert sweep on the configured cron and runs until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::error::AppResult;
use crate::jobs::{AlertSweepTask, JobContext, JobScheduler, SweepPassSummary};
use crate::services::AlertService;

pub struct ScheduleCommandHandler {
    alerts: AlertService,
    config: SchedulerConfig,
}

impl ScheduleCommandHandler {
    pub fn new(alerts: AlertService, config: SchedulerConfig) -> Self {
        Self { alerts, config }
    }

    fn task(&self) -> AlertSweepTask {
        AlertSweepTask::new(self.alerts.clone(), self.config.max_concurrent_sweeps)
    }

    /// Runs a single pass over every alert user.
    pub async fn run_once(&self) -> AppResult<SweepPassSummary> {
        let ctx = JobContext::new(AlertSweepTask::NAME, CancellationToken::new());
        let summary = self.task().run_pass(&ctx, Timestamp::now()).await?;
        println!(
            "Swept {} of {} user(s): {} notification(s), {} failed",
            summary.swept,
            summary.users,
            summary.notifications_created,
            summary.failed
        );
        Ok(summary)
    }

    /// Runs the cron scheduler until Ctrl-C.
    pub async fn run(&self) -> AppResult<()> {
        if !self.config.enabled {
            tracing::warn!("Scheduler disabled in configuration, nothing to run");
            return Ok(());
        }

        let scheduler = JobScheduler::new(Duration::from_secs(self.config.timeout_seconds)).await?;
        scheduler
            .register(&self.config.cron, Arc::new(self.task()))
            .await?;
        scheduler.start().await?;
        tracing::info!(
            cron = %self.config.cron,
            max_concurrent_sweeps = self.config.max_concurrent_sweeps,
            "Alert scheduler running, press Ctrl-C to stop"
        );

        tokio::signal::ctrl_c().await.map_err(|e| crate::error::AppError::Internal {
            source: anyhow::Error::from(e),
        })?;

        tracing::info!("Shutdown signal received, stopping scheduler");
        scheduler.stop().await?;
        Ok(())
    }
}
