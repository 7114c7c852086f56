use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};
use tokio_util::sync::CancellationToken;

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::executor::JobExecutor;
use crate::jobs::types::JobTask;

/// Wrapper around tokio-cron-scheduler running registered tasks through a [`JobExecutor`]
pub struct JobScheduler {
    scheduler: Arc<Mutex<TokioCronScheduler>>,
    executor: Arc<JobExecutor>,
    shutdown: CancellationToken,
}

impl JobScheduler {
    /// `timeout` bounds every single run of a registered task.
    pub async fn new(timeout: Duration) -> JobResult<Self> {
        let scheduler = TokioCronScheduler::new()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;
        let shutdown = CancellationToken::new();

        Ok(Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            executor: Arc::new(JobExecutor::new(timeout, shutdown.clone())),
            shutdown,
        })
    }

    /// Token cancelled by [`JobScheduler::stop`]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Schedule `task` on a six-field cron expression (seconds first)
    pub async fn register(&self, cron: &str, task: Arc<dyn JobTask>) -> JobResult<()> {
        let executor = Arc::clone(&self.executor);
        let name = task.name().to_string();

        let cron_job = Job::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let task = Arc::clone(&task);

            Box::pin(async move {
                match executor.execute_job(task).await {
                    Ok(()) => {}
                    Err(JobError::AlreadyRunning(name)) => {
                        tracing::warn!(job = %name, "Previous run still in progress, skipping");
                    }
                    Err(e) => tracing::error!(error = %e, "Scheduled job failed"),
                }
            })
        })
        .map_err(|e| JobError::InvalidCronExpression(format!("{}: {}", cron, e)))?;

        self.scheduler
            .lock()
            .await
            .add(cron_job)
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))?;

        tracing::info!(job = %name, cron, "Job registered");
        Ok(())
    }

    pub async fn start(&self) -> JobResult<()> {
        self.scheduler
            .lock()
            .await
            .start()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))
    }

    /// Cancel in-flight runs and stop the scheduler
    pub async fn stop(&self) -> JobResult<()> {
        self.shutdown.cancel();
        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .map_err(|e| JobError::Scheduler(e.to_string()))
    }
}
