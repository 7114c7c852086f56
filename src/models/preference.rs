//! Per-user job preferences and alert settings.
//!
//! Both are owned by the user and edited elsewhere; the engine only reads them.

use std::collections::BTreeSet;
use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type UserId = i64;

/// What a user is looking for.
///
/// Sets are ordered so that iteration, and therefore scoring, is stable.
/// Blank entries are ignored by every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceModel {
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub locations: BTreeSet<String>,
    #[serde(default)]
    pub job_types: BTreeSet<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
}

impl PreferenceModel {
    pub fn has_roles(&self) -> bool {
        has_entries(&self.roles)
    }

    pub fn has_locations(&self) -> bool {
        has_entries(&self.locations)
    }

    pub fn has_job_types(&self) -> bool {
        has_entries(&self.job_types)
    }

    /// True when any of roles, locations or job types is set.
    ///
    /// Experience level alone does not count: it never narrows the feed.
    pub fn declares_filter_fields(&self) -> bool {
        self.has_roles() || self.has_locations() || self.has_job_types()
    }

    /// Non-blank entries, lowercased for case-insensitive comparison.
    pub(crate) fn normalized(set: &BTreeSet<String>) -> impl Iterator<Item = String> + '_ {
        set.iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .map(str::to_lowercase)
    }
}

fn has_entries(set: &BTreeSet<String>) -> bool {
    set.iter().any(|entry| !entry.trim().is_empty())
}

/// How often matched jobs should be emailed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum EmailFrequency {
    Instant,
    #[default]
    Daily,
    Weekly,
    Never,
}

impl EmailFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailFrequency::Instant => "instant",
            EmailFrequency::Daily => "daily",
            EmailFrequency::Weekly => "weekly",
            EmailFrequency::Never => "never",
        }
    }
}

impl FromStr for EmailFrequency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instant" => Ok(EmailFrequency::Instant),
            "daily" => Ok(EmailFrequency::Daily),
            "weekly" => Ok(EmailFrequency::Weekly),
            "never" => Ok(EmailFrequency::Never),
            _ => Err(AppError::Validation {
                field: "email_frequency".to_string(),
                reason: format!("Unrecognized email frequency: {}", s),
            }),
        }
    }
}

impl diesel::query_builder::QueryId for EmailFrequency {
    type QueryId = EmailFrequency;
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl ToSql<Text, Pg> for EmailFrequency {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for EmailFrequency {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse()
            .map_err(|_| format!("Unrecognized email_frequency: {}", s).into())
    }
}

/// Alert delivery settings for one user
///
/// A user who never saved settings gets alerts enabled with daily email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub alerts_enabled: bool,
    pub email_frequency: EmailFrequency,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            email_frequency: EmailFrequency::default(),
        }
    }
}

impl NotificationSettings {
    pub fn wants_instant_email(&self) -> bool {
        self.email_frequency == EmailFrequency::Instant
    }
}

// ============================================================================
// Database rows
// ============================================================================

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::job_preferences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PreferenceRecord {
    pub user_id: i64,
    pub roles: Vec<String>,
    pub locations: Vec<String>,
    pub job_types: Vec<String>,
    pub experience_level: Option<String>,
}

impl From<PreferenceRecord> for PreferenceModel {
    fn from(record: PreferenceRecord) -> Self {
        Self {
            roles: record.roles.into_iter().collect(),
            locations: record.locations.into_iter().collect(),
            job_types: record.job_types.into_iter().collect(),
            experience_level: record.experience_level,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::notification_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationSettingsRecord {
    pub user_id: i64,
    pub alerts_enabled: bool,
    pub email_frequency: EmailFrequency,
}

impl From<NotificationSettingsRecord> for NotificationSettings {
    fn from(record: NotificationSettingsRecord) -> Self {
        Self {
            alerts_enabled: record.alerts_enabled,
            email_frequency: record.email_frequency,
        }
    }
}
