//! Recency bonus for freshly posted jobs.

use jiff::Timestamp;

const SECONDS_PER_DAY: i64 = 86_400;

/// Bonus contributed by the age of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyBoost {
    pub points: u32,
    /// Set for postings at most two days old; these carry the "New post" reason.
    pub is_new: bool,
}

/// Whole days between posting and `now`, truncated. Postings dated in the
/// future count as zero days old.
pub fn age_in_days(posted_at: Timestamp, now: Timestamp) -> i64 {
    now.duration_since(posted_at).as_secs().max(0) / SECONDS_PER_DAY
}

pub fn recency_boost(posted_at: Timestamp, now: Timestamp) -> RecencyBoost {
    match age_in_days(posted_at, now) {
        0..=2 => RecencyBoost {
            points: 5,
            is_new: true,
        },
        3..=7 => RecencyBoost {
            points: 3,
            is_new: false,
        },
        8..=14 => RecencyBoost {
            points: 1,
            is_new: false,
        },
        _ => RecencyBoost {
            points: 0,
            is_new: false,
        },
    }
}
