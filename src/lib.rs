//! Job Alerts Library
//!
//! Preference-based job matching, feed ranking and deduplicated job alerts.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod logger;
pub mod matching;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod services;
pub mod state;

pub use matching::{MatchResult, rank_jobs, score_job};
pub use services::alerts::{AlertSweep, SweepReport};
pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
