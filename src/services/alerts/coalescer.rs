//! Per-user trigger coalescing for alert sweeps.

use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jiff::{SignedDuration, Timestamp};

use crate::models::UserId;

/// Holds the last sweep start per user and answers "should I run now".
///
/// `try_begin` claims a slot atomically, so two triggers for the same user
/// within one interval never both run.
#[derive(Debug)]
pub struct SweepCoalescer {
    interval: SignedDuration,
    last_runs: DashMap<UserId, Timestamp>,
}

impl SweepCoalescer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: SignedDuration::try_from(interval).unwrap_or(SignedDuration::MAX),
            last_runs: DashMap::new(),
        }
    }

    pub fn interval(&self) -> SignedDuration {
        self.interval
    }

    pub fn last_run(&self, user_id: UserId) -> Option<Timestamp> {
        self.last_runs.get(&user_id).map(|entry| *entry.value())
    }

    /// True when the user never ran or the last run is at least one interval old.
    pub fn should_run(&self, user_id: UserId, now: Timestamp) -> bool {
        self.last_runs
            .get(&user_id)
            .is_none_or(|last| self.is_due(*last, now))
    }

    /// Records `now` as the user's last run if a run is due.
    ///
    /// Returns false when another trigger already claimed the current interval.
    pub fn try_begin(&self, user_id: UserId, now: Timestamp) -> bool {
        match self.last_runs.entry(user_id) {
            Entry::Occupied(mut entry) => {
                if !self.is_due(*entry.get(), now) {
                    return false;
                }
                entry.insert(now);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Records a run that happened outside `try_begin`, such as a scheduled pass.
    pub fn record(&self, user_id: UserId, at: Timestamp) {
        self.last_runs
            .entry(user_id)
            .and_modify(|last| *last = (*last).max(at))
            .or_insert(at);
    }

    /// Drops the user's claim so the next trigger runs immediately.
    pub fn forget(&self, user_id: UserId) {
        self.last_runs.remove(&user_id);
    }

    /// Removes entries last run before `cutoff`. Returns how many were removed.
    pub fn purge_older_than(&self, cutoff: Timestamp) -> usize {
        let before = self.last_runs.len();
        self.last_runs.retain(|_, last| *last >= cutoff);
        before.saturating_sub(self.last_runs.len())
    }

    pub fn len(&self) -> usize {
        self.last_runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_runs.is_empty()
    }

    fn is_due(&self, last: Timestamp, now: Timestamp) -> bool {
        now.duration_since(last) >= self.interval
    }
}
