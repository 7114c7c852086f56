//! Notification and alert ledger models.

use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::{JobId, UserId};

/// Delivery medium for a job alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::AlertChannel")]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    InApp,
    Email,
}

impl AlertChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertChannel::InApp => "in_app",
            AlertChannel::Email => "email",
        }
    }

    /// Notification type handed to the sink for this channel.
    pub fn notification_kind(&self) -> &'static str {
        match self {
            AlertChannel::InApp => "job_alert",
            AlertChannel::Email => "job_alert_email",
        }
    }
}

impl std::fmt::Display for AlertChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Notification
// ============================================================================

/// Record handed to the notification sink. Its lifecycle after creation
/// (read state, deletion) belongs to the notification center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: UserId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: JsonValue,
}

/// NewNotificationRecord insert model for INSERT operations
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotificationRecord {
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub metadata: JsonValue,
}

impl From<&Notification> for NewNotificationRecord {
    fn from(notification: &Notification) -> Self {
        Self {
            user_id: notification.user_id,
            kind: notification.kind.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            link: notification.link.clone(),
            metadata: notification.metadata.clone(),
        }
    }
}

// ============================================================================
// Alert ledger
// ============================================================================

/// One fired alert. At most one row exists per (user_id, job_id, channel).
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::alert_ledger)]
pub struct NewAlertLedgerEntry {
    pub user_id: i64,
    pub job_id: i64,
    pub channel: AlertChannel,
    pub sent_at: jiff_diesel::Timestamp,
}

/// Domain view of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertLedgerEntry {
    pub user_id: UserId,
    pub job_id: JobId,
    pub channel: AlertChannel,
    pub sent_at: Timestamp,
}
