use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::types::{JobContext, JobTask};

/// Tracks which tasks are currently running
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyTracker {
    running: Arc<DashSet<String>>,
}

impl ConcurrencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as running. Returns false when it already is.
    pub fn try_acquire(&self, name: &str) -> bool {
        self.running.insert(name.to_string())
    }

    pub fn release(&self, name: &str) {
        self.running.remove(name);
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }
}

/// Executes tasks with a timeout and without overlapping runs
#[derive(Debug, Clone)]
pub struct JobExecutor {
    timeout: Duration,
    concurrency: ConcurrencyTracker,
    shutdown: CancellationToken,
}

impl JobExecutor {
    pub fn new(timeout: Duration, shutdown: CancellationToken) -> Self {
        Self {
            timeout,
            concurrency: ConcurrencyTracker::new(),
            shutdown,
        }
    }

    pub fn concurrency(&self) -> &ConcurrencyTracker {
        &self.concurrency
    }

    pub async fn execute_job(&self, task: Arc<dyn JobTask>) -> JobResult<()> {
        let name = task.name().to_string();
        if !self.concurrency.try_acquire(&name) {
            return Err(JobError::AlreadyRunning(name));
        }

        let result = self.execute_with_timeout(&name, task).await;
        self.concurrency.release(&name);
        result
    }

    async fn execute_with_timeout(&self, name: &str, task: Arc<dyn JobTask>) -> JobResult<()> {
        if self.shutdown.is_cancelled() {
            return Err(JobError::Cancelled(name.to_string()));
        }

        let token = self.shutdown.child_token();
        let ctx = JobContext::new(name, token.clone());
        let execution_id = ctx.execution_id;
        let start_time = Instant::now();

        tracing::info!(job = name, %execution_id, "Job started");
        let result = tokio::time::timeout(self.timeout, task.execute(ctx)).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(())) => {
                tracing::info!(job = name, %execution_id, duration_ms, "Job completed");
                Ok(())
            }
            Ok(Err(e)) => {
                tracing::error!(job = name, %execution_id, duration_ms, error = %e, "Job failed");
                Err(JobError::Task(e))
            }
            Err(_) => {
                // let in-flight work observe the timeout
                token.cancel();
                tracing::error!(job = name, %execution_id, duration_ms, "Job timed out");
                Err(JobError::Timeout(self.timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingTask {
        runs: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl JobTask for CountingTask {
        fn name(&self) -> &str {
            "counting"
        }

        async fn execute(&self, _ctx: JobContext) -> AppResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(AppError::store("count", anyhow::anyhow!("boom")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_job_success_releases_slot() {
        let executor = JobExecutor::new(Duration::from_secs(5), CancellationToken::new());
        let task = Arc::new(CountingTask::default());

        executor.execute_job(task.clone()).await.unwrap();
        executor.execute_job(task.clone()).await.unwrap();

        assert_eq!(task.runs.load(Ordering::SeqCst), 2);
        assert!(!executor.concurrency().is_running("counting"));
    }

    #[tokio::test]
    async fn test_execute_job_propagates_task_error() {
        let executor = JobExecutor::new(Duration::from_secs(5), CancellationToken::new());
        let task = Arc::new(CountingTask {
            fail: true,
            ..Default::default()
        });

        let err = executor.execute_job(task).await.unwrap_err();

        assert!(matches!(err, JobError::Task(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_execute_job_times_out() {
        let executor = JobExecutor::new(Duration::from_millis(20), CancellationToken::new());
        let task = Arc::new(CountingTask {
            delay: Duration::from_secs(10),
            ..Default::default()
        });

        let err = executor.execute_job(task).await.unwrap_err();

        assert!(matches!(err, JobError::Timeout(_)));
        assert!(!executor.concurrency().is_running("counting"));
    }

    #[tokio::test]
    async fn test_overlapping_run_rejected() {
        let executor = JobExecutor::new(Duration::from_secs(60), CancellationToken::new());
        let task = Arc::new(CountingTask {
            delay: Duration::from_millis(200),
            ..Default::default()
        });

        let first = {
            let executor = executor.clone();
            let task = task.clone();
            tokio::spawn(async move { executor.execute_job(task).await })
        };
        while !executor.concurrency().is_running("counting") {
            tokio::task::yield_now().await;
        }

        let second = executor.execute_job(task.clone()).await;

        assert!(matches!(second, Err(JobError::AlreadyRunning(_))));
        first.await.unwrap().unwrap();
        assert_eq!(task.runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_executor_skips_run() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let executor = JobExecutor::new(Duration::from_secs(5), shutdown);
        let task = Arc::new(CountingTask::default());

        let err = executor.execute_job(task.clone()).await.unwrap_err();

        assert!(matches!(err, JobError::Cancelled(_)));
        assert_eq!(task.runs.load(Ordering::SeqCst), 0);
    }
}
