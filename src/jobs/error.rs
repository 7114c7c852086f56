use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job execution timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// A previous run of the same task has not finished yet
    #[error("Job already running: {0}")]
    AlreadyRunning(String),

    #[error("Job cancelled: {0}")]
    Cancelled(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error(transparent)]
    Task(#[from] AppError),
}

pub type JobResult<T> = Result<T, JobError>;

impl From<JobError> for AppError {
    fn from(error: JobError) -> Self {
        match error {
            JobError::Task(inner) => inner,
            other => AppError::Internal {
                source: anyhow::Error::from(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_unwraps_into_app_error() {
        let err: AppError = JobError::Task(AppError::PreferenceUnavailable { user_id: 7 }).into();
        assert!(matches!(err, AppError::PreferenceUnavailable { user_id: 7 }));
    }

    #[test]
    fn test_scheduler_errors_become_internal() {
        let err: AppError = JobError::Timeout(30).into();
        match err {
            AppError::Internal { source } => {
                assert_eq!(source.to_string(), "Job execution timeout after 30s");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
