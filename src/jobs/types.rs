use async_trait::async_trait;
use jiff::Timestamp;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AppResult;

/// Job execution context passed to tasks
#[derive(Debug, Clone)]
pub struct JobContext {
    pub execution_id: Uuid,
    pub job_name: String,
    pub started_at: Timestamp,
    /// Cancelled when the scheduler shuts down or the run times out
    pub cancellation_token: CancellationToken,
}

impl JobContext {
    pub fn new(job_name: impl Into<String>, cancellation_token: CancellationToken) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            job_name: job_name.into(),
            started_at: Timestamp::now(),
            cancellation_token,
        }
    }
}

/// Trait that all scheduled tasks implement
#[async_trait]
pub trait JobTask: Send + Sync + std::fmt::Debug {
    /// Unique name for this task; runs of the same name never overlap
    fn name(&self) -> &str;

    async fn execute(&self, ctx: JobContext) -> AppResult<()>;

    fn description(&self) -> Option<String> {
        None
    }
}
