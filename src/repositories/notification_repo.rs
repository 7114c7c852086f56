//! Notification repository for async database operations.
//!
//! Provides insert-only access to the notifications table used by the
//! notification center.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{AsyncDbPool, checkout};
use crate::error::{AppError, AppResult};
use crate::models::{NewNotificationRecord, Notification};
use crate::repositories::traits::NotificationSink;
use crate::schema::notifications;

/// Notification repository
#[derive(Clone)]
pub struct NotificationRepository {
    pool: AsyncDbPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl NotificationSink for NotificationRepository {
    async fn create_notification(&self, notification: &Notification) -> AppResult<()> {
        let job_id = notification
            .metadata
            .get("job_id")
            .and_then(|value| value.as_i64())
            .unwrap_or_default();
        let sink_failure = |source: anyhow::Error| AppError::NotificationSinkFailure {
            user_id: notification.user_id,
            job_id,
            source,
        };

        let mut conn = checkout(&self.pool)
            .await
            .map_err(|e| sink_failure(anyhow::Error::from(e)))?;

        diesel::insert_into(notifications::table)
            .values(NewNotificationRecord::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| sink_failure(anyhow::Error::from(e)))
    }
}
