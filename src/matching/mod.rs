//! Preference matching engine.
//!
//! A single scorer shared by the live feed (additive score, zero-score cut)
//! and the alert sweep (conjunctive per-field filter). The two inclusion
//! policies intentionally differ: a job that only earns recency points stays
//! in the feed but never triggers an alert.

mod ranker;
mod recency;
mod scorer;

pub use ranker::rank_jobs;
pub use recency::{RecencyBoost, age_in_days, recency_boost};
pub use scorer::{
    EXPERIENCE_POINTS, LOCATION_POINTS, MatchReason, MatchResult, ROLE_POINTS, RuleHits,
    TYPE_POINTS, score_job,
};
