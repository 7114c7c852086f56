//! Feed ranking over the full set of open jobs.

use std::cmp::Ordering;

use jiff::Timestamp;

use crate::matching::scorer::{MatchResult, score_job};
use crate::models::{Job, PreferenceModel};

/// Scores every job and orders the feed by descending score, then newest first.
///
/// Jobs scoring exactly 0 are dropped only when `prefs` declares at least one
/// of roles, locations or job types. Without preferences, or with none of
/// those fields set, every job is returned.
///
/// Pure: safe to call concurrently and repeatedly; the same input always
/// yields the same ordering.
pub fn rank_jobs(jobs: &[Job], prefs: Option<&PreferenceModel>, now: Timestamp) -> Vec<MatchResult> {
    let filter_zero = prefs.is_some_and(PreferenceModel::declares_filter_fields);

    let mut ranked: Vec<MatchResult> = jobs
        .iter()
        .map(|job| score_job(job, prefs, now))
        .filter(|result| !filter_zero || result.score > 0)
        .collect();

    ranked.sort_by(feed_order);
    ranked
}

fn feed_order(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.job.posted_at.cmp(&a.job.posted_at))
        .then_with(|| a.job.id.cmp(&b.job.id))
}
