//! Job posting models.
//!
//! `Job` is the immutable view the matching engine works on; `JobRecord` is
//! the diesel row it is loaded from.

use std::io::Write;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type JobId = i64;

// ============================================================================
// Enums
// ============================================================================

/// Employment type of a posting
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
    Remote,
}

impl EmploymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full-time",
            EmploymentType::PartTime => "part-time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Freelance => "freelance",
            EmploymentType::Remote => "remote",
        }
    }
}

impl FromStr for EmploymentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full-time" => Ok(EmploymentType::FullTime),
            "part-time" => Ok(EmploymentType::PartTime),
            "contract" => Ok(EmploymentType::Contract),
            "internship" => Ok(EmploymentType::Internship),
            "freelance" => Ok(EmploymentType::Freelance),
            "remote" => Ok(EmploymentType::Remote),
            _ => Err(AppError::Validation {
                field: "employment_type".to_string(),
                reason: format!("Unrecognized employment type: {}", s),
            }),
        }
    }
}

impl std::fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl diesel::query_builder::QueryId for EmploymentType {
    type QueryId = EmploymentType;
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl ToSql<Text, Pg> for EmploymentType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for EmploymentType {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse()
            .map_err(|_| format!("Unrecognized employment_type: {}", s).into())
    }
}

/// Where the work happens
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteMode {
    OnSite,
    Remote,
    Hybrid,
}

impl RemoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteMode::OnSite => "on-site",
            RemoteMode::Remote => "remote",
            RemoteMode::Hybrid => "hybrid",
        }
    }

    /// Remote and hybrid postings both satisfy a "remote" preference.
    pub fn is_remote_compatible(&self) -> bool {
        matches!(self, RemoteMode::Remote | RemoteMode::Hybrid)
    }
}

impl FromStr for RemoteMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on-site" | "onsite" => Ok(RemoteMode::OnSite),
            "remote" => Ok(RemoteMode::Remote),
            "hybrid" => Ok(RemoteMode::Hybrid),
            _ => Err(AppError::Validation {
                field: "remote_mode".to_string(),
                reason: format!("Unrecognized remote mode: {}", s),
            }),
        }
    }
}

impl std::fmt::Display for RemoteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl diesel::query_builder::QueryId for RemoteMode {
    type QueryId = RemoteMode;
    const HAS_STATIC_QUERY_ID: bool = false;
}

impl ToSql<Text, Pg> for RemoteMode {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for RemoteMode {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        s.parse()
            .map_err(|_| format!("Unrecognized remote_mode: {}", s).into())
    }
}

// ============================================================================
// Job
// ============================================================================

/// An open or draft position as seen by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub remote_mode: RemoteMode,
    pub experience_level: Option<String>,
    pub posted_at: Timestamp,
}

/// Job query model for SELECT operations
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub company: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub remote_mode: RemoteMode,
    pub experience_level: Option<String>,
    pub is_open: bool,
    pub posted_at: jiff_diesel::Timestamp,
}

impl From<JobRecord> for Job {
    fn from(record: JobRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            company: record.company,
            location: record.location,
            employment_type: record.employment_type,
            remote_mode: record.remote_mode,
            experience_level: record.experience_level,
            posted_at: record.posted_at.to_jiff(),
        }
    }
}
