use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::{AsyncDbPool, checkout};
use crate::error::{AppError, AppResult};
use crate::models::{
    NotificationSettings, NotificationSettingsRecord, PreferenceModel, PreferenceRecord, UserId,
};
use crate::repositories::traits::{PreferenceStore, UserDirectory};
use crate::schema::{job_preferences, notification_settings};

/// Reads job preferences and alert settings.
///
/// Any failure while reading preferences is reported as
/// `PreferenceUnavailable` so the sweep can skip the user cleanly.
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: AsyncDbPool,
}

impl PreferenceRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn get_preferences(&self, user_id: UserId) -> AppResult<Option<PreferenceModel>> {
        let mut conn = checkout(&self.pool).await.map_err(|e| {
            tracing::debug!(user_id, error = %e, "No connection for preference read");
            AppError::PreferenceUnavailable { user_id }
        })?;

        let record = job_preferences::table
            .find(user_id)
            .select(PreferenceRecord::as_select())
            .first::<PreferenceRecord>(&mut conn)
            .await
            .optional()
            .map_err(|e| {
                tracing::debug!(user_id, error = %e, "Preference query failed");
                AppError::PreferenceUnavailable { user_id }
            })?;

        Ok(record.map(PreferenceModel::from))
    }

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<NotificationSettings>> {
        let mut conn = checkout(&self.pool).await?;

        let record = notification_settings::table
            .find(user_id)
            .select(NotificationSettingsRecord::as_select())
            .first::<NotificationSettingsRecord>(&mut conn)
            .await
            .optional()
            .map_err(|e| AppError::store("get notification settings", e))?;

        Ok(record.map(NotificationSettings::from))
    }
}

#[async_trait]
impl UserDirectory for PreferenceRepository {
    /// Users with saved preferences whose alerts are not switched off.
    ///
    /// A user without a settings row is included; the sweep applies the
    /// defaults itself.
    async fn list_alert_users(&self) -> AppResult<Vec<UserId>> {
        let mut conn = checkout(&self.pool).await?;

        job_preferences::table
            .left_join(
                notification_settings::table
                    .on(notification_settings::user_id.eq(job_preferences::user_id)),
            )
            .filter(
                notification_settings::alerts_enabled
                    .eq(true)
                    .or(notification_settings::user_id.is_null()),
            )
            .select(job_preferences::user_id)
            .order(job_preferences::user_id.asc())
            .load::<i64>(&mut conn)
            .await
            .map_err(|e| AppError::store("list alert users", e))
    }
}
