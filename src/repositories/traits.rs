//! Store seams consumed by the matching engine.
//!
//! Each trait is implemented once against Postgres and once in memory. All
//! implementations must be Send + Sync for use behind `Arc<dyn ...>`.

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::AppResult;
use crate::models::{
    AlertChannel, Job, JobId, Notification, NotificationSettings, PreferenceModel, UserId,
};

/// Read-only access to user preferences and alert settings.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// `None` when the user never saved preferences.
    async fn get_preferences(&self, user_id: UserId) -> AppResult<Option<PreferenceModel>>;

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<NotificationSettings>>;
}

/// Read-only access to job postings.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Open jobs posted at or after `posted_since`.
    async fn list_jobs(&self, posted_since: Timestamp) -> AppResult<Vec<Job>>;

    async fn list_all_open_jobs(&self) -> AppResult<Vec<Job>>;
}

/// Append-only record of alerts already fired.
///
/// Implementations must enforce uniqueness of (user, job, channel) in the
/// store itself; a check-then-insert in application code is not enough when
/// two sweeps race.
#[async_trait]
pub trait DeduplicationLedger: Send + Sync {
    async fn has_fired(&self, user_id: UserId, job_id: JobId, channel: AlertChannel)
    -> AppResult<bool>;

    /// Fails with `AppError::DuplicateLedgerEntry` when the triple already exists.
    async fn record_fired(
        &self,
        user_id: UserId,
        job_id: JobId,
        channel: AlertChannel,
        sent_at: Timestamp,
    ) -> AppResult<()>;
}

/// Write-only destination for notification records.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Returns only once the notification is durably created.
    async fn create_notification(&self, notification: &Notification) -> AppResult<()>;
}

/// Lists the users the periodic scheduler should sweep.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_alert_users(&self) -> AppResult<Vec<UserId>>;
}
