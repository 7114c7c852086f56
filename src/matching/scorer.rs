//! Preference scoring for a single job.
//!
//! Rules are evaluated in a fixed order and are independently additive:
//!
//! | rule       | points | reason             |
//! |------------|--------|--------------------|
//! | role       | 10     | "Role match"       |
//! | location   | 5      | "Location match"   |
//! | job type   | 3      | "Type match"       |
//! | experience | 3      | "Experience match" |
//! | recency    | 5/3/1  | "New post" (≤2d)   |
//!
//! Reasons always follow this order, whichever rules fire.

use jiff::Timestamp;
use serde::{Serialize, Serializer};

use crate::matching::recency::{RecencyBoost, recency_boost};
use crate::models::{Job, PreferenceModel};

pub const ROLE_POINTS: u32 = 10;
pub const LOCATION_POINTS: u32 = 5;
pub const TYPE_POINTS: u32 = 3;
pub const EXPERIENCE_POINTS: u32 = 3;

/// Preference token that also accepts remote and hybrid postings.
const REMOTE_TOKEN: &str = "remote";

/// Human-readable explanation for a rule that contributed to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchReason {
    Role,
    Location,
    Type,
    Experience,
    NewPost,
}

impl MatchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchReason::Role => "Role match",
            MatchReason::Location => "Location match",
            MatchReason::Type => "Type match",
            MatchReason::Experience => "Experience match",
            MatchReason::NewPost => "New post",
        }
    }
}

impl std::fmt::Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MatchReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Pass/fail outcome of each preference rule, before any points are summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleHits {
    pub role: bool,
    pub location: bool,
    pub job_type: bool,
    pub experience: bool,
}

impl RuleHits {
    pub fn evaluate(job: &Job, prefs: &PreferenceModel) -> Self {
        Self {
            role: role_matches(job, prefs),
            location: location_matches(job, prefs),
            job_type: job_type_matches(job, prefs),
            experience: experience_matches(job, prefs),
        }
    }

    /// Conjunctive alert filter: every declared field among roles, locations
    /// and job types must match. Undeclared fields do not constrain.
    pub fn passes_alert_filters(&self, prefs: &PreferenceModel) -> bool {
        (!prefs.has_roles() || self.role)
            && (!prefs.has_locations() || self.location)
            && (!prefs.has_job_types() || self.job_type)
    }
}

/// A job annotated with its score. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub job: Job,
    pub score: u32,
    pub reasons: Vec<MatchReason>,
}

/// Scores `job` against `prefs` as of `now`.
///
/// Without preferences every job scores 0 with no reasons; callers treat that
/// as "show everything", not "nothing matches".
pub fn score_job(job: &Job, prefs: Option<&PreferenceModel>, now: Timestamp) -> MatchResult {
    let Some(prefs) = prefs else {
        return MatchResult {
            job: job.clone(),
            score: 0,
            reasons: Vec::new(),
        };
    };

    let hits = RuleHits::evaluate(job, prefs);
    let (score, reasons) = tally(&hits, recency_boost(job.posted_at, now));

    MatchResult {
        job: job.clone(),
        score,
        reasons,
    }
}

fn tally(hits: &RuleHits, recency: RecencyBoost) -> (u32, Vec<MatchReason>) {
    let rules = [
        (hits.role, ROLE_POINTS, MatchReason::Role),
        (hits.location, LOCATION_POINTS, MatchReason::Location),
        (hits.job_type, TYPE_POINTS, MatchReason::Type),
        (hits.experience, EXPERIENCE_POINTS, MatchReason::Experience),
    ];

    let mut score = 0;
    let mut reasons = Vec::with_capacity(rules.len() + 1);
    for (hit, points, reason) in rules {
        if hit {
            score += points;
            reasons.push(reason);
        }
    }

    score += recency.points;
    if recency.is_new {
        reasons.push(MatchReason::NewPost);
    }

    (score, reasons)
}

fn role_matches(job: &Job, prefs: &PreferenceModel) -> bool {
    let title = job.title.to_lowercase();
    let description = job.description.to_lowercase();
    PreferenceModel::normalized(&prefs.roles)
        .any(|role| title.contains(&role) || description.contains(&role))
}

fn location_matches(job: &Job, prefs: &PreferenceModel) -> bool {
    let location = job.location.to_lowercase();
    PreferenceModel::normalized(&prefs.locations).any(|wanted| location.contains(&wanted))
}

fn job_type_matches(job: &Job, prefs: &PreferenceModel) -> bool {
    let employment = job.employment_type.as_str();
    PreferenceModel::normalized(&prefs.job_types).any(|token| {
        token == employment || (token == REMOTE_TOKEN && job.remote_mode.is_remote_compatible())
    })
}

fn experience_matches(job: &Job, prefs: &PreferenceModel) -> bool {
    match (prefs.experience_level.as_deref(), job.experience_level.as_deref()) {
        (Some(wanted), Some(offered)) => {
            let (wanted, offered) = (wanted.trim(), offered.trim());
            !wanted.is_empty() && wanted == offered
        }
        _ => false,
    }
}
