use crate::error::DatabaseErrorConverter;
use crate::models::AlertChannel;
use thiserror::Error;

/// Application-wide error type for the matching and alerting engine.
///
/// Scoring and ranking are infallible; every variant here originates in a
/// data-fetch or persistence step, or in configuration.
#[derive(Error, Debug)]
pub enum AppError {
    /// Preferences for the user could not be read; the sweep skips the user
    #[error("Preferences unavailable for user {user_id}")]
    PreferenceUnavailable { user_id: i64 },

    /// A backing store failed; transient, retried at the next trigger
    #[error("Store unavailable during {operation}")]
    StoreUnavailable {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// The ledger already holds this (user, job, channel) triple
    #[error("Alert already recorded: user={user_id} job={job_id} channel={channel}")]
    DuplicateLedgerEntry {
        user_id: i64,
        job_id: i64,
        channel: AlertChannel,
    },

    /// The notification sink rejected or failed to persist a notification
    #[error("Notification sink failed for user {user_id}, job {job_id}")]
    NotificationSinkFailure {
        user_id: i64,
        job_id: i64,
        #[source]
        source: anyhow::Error,
    },

    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Duplicate entry error for unique constraint violations
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Whether the next scheduled trigger is expected to succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::StoreUnavailable { .. }
                | AppError::ConnectionPool { .. }
                | AppError::NotificationSinkFailure { .. }
        )
    }

    pub(crate) fn store(operation: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::StoreUnavailable {
            operation: operation.into(),
            source: source.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = match &error {
            crate::config::error::ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
