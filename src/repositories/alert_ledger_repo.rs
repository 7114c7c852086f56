use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::db::{AsyncDbPool, checkout};
use crate::error::{AppError, AppResult};
use crate::models::{AlertChannel, JobId, NewAlertLedgerEntry, UserId};
use crate::repositories::traits::DeduplicationLedger;
use crate::schema::alert_ledger;

/// Postgres-backed dedup ledger.
///
/// Uniqueness is enforced by `alert_ledger_user_id_job_id_channel_key`; a
/// concurrent insert of the same triple surfaces as `DuplicateLedgerEntry`.
#[derive(Clone)]
pub struct AlertLedgerRepository {
    pool: AsyncDbPool,
}

impl AlertLedgerRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeduplicationLedger for AlertLedgerRepository {
    async fn has_fired(&self, user_id: UserId, job_id: JobId, channel: AlertChannel) -> AppResult<bool> {
        let mut conn = checkout(&self.pool).await?;

        diesel::select(exists(
            alert_ledger::table
                .filter(alert_ledger::user_id.eq(user_id))
                .filter(alert_ledger::job_id.eq(job_id))
                .filter(alert_ledger::channel.eq(channel)),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(|e| AppError::store("check alert ledger", e))
    }

    async fn record_fired(
        &self,
        user_id: UserId,
        job_id: JobId,
        channel: AlertChannel,
        sent_at: Timestamp,
    ) -> AppResult<()> {
        let mut conn = checkout(&self.pool).await?;

        let entry = NewAlertLedgerEntry {
            user_id,
            job_id,
            channel,
            sent_at: sent_at.to_diesel(),
        };

        diesel::insert_into(alert_ledger::table)
            .values(&entry)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| match AppError::from(e) {
                AppError::Duplicate { entity, .. } if entity == "alert_ledger" => {
                    AppError::DuplicateLedgerEntry {
                        user_id,
                        job_id,
                        channel,
                    }
                }
                other => other,
            })
    }
}
