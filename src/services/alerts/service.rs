//! Alert service: coalesced entry points around [`AlertSweep`].

use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;

use super::coalescer::SweepCoalescer;
use super::sweep::{AlertSweep, SweepReport};
use crate::error::AppResult;
use crate::models::UserId;
use crate::repositories::UserDirectory;
use crate::services::rate_limiter::RateLimiter;

/// Entries removed by [`AlertService::housekeeping`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Housekeeping {
    pub purged: usize,
    pub cleaned: usize,
    pub unlocked: usize,
}

/// Alert service handling triggered and scheduled sweeps
#[derive(Clone)]
pub struct AlertService {
    sweep: AlertSweep,
    users: Arc<dyn UserDirectory>,
    coalescer: Arc<SweepCoalescer>,
    limiter: Arc<RateLimiter>,
}

impl AlertService {
    /// Creates a new AlertService
    ///
    /// # Arguments
    /// * `sweep` - The sweep orchestrator
    /// * `users` - Source of users to sweep on schedule
    /// * `limiter` - Throttle for on-demand sweep requests
    pub fn new(sweep: AlertSweep, users: Arc<dyn UserDirectory>, limiter: Arc<RateLimiter>) -> Self {
        let interval = Duration::from_secs(sweep.config().coalesce_interval_secs);
        Self {
            sweep,
            users,
            coalescer: Arc::new(SweepCoalescer::new(interval)),
            limiter,
        }
    }

    pub fn coalescer(&self) -> &SweepCoalescer {
        &self.coalescer
    }

    /// Runs one sweep immediately, bypassing coalescing.
    pub async fn run_alert_sweep(&self, user_id: UserId) -> AppResult<SweepReport> {
        self.sweep.run(user_id, Timestamp::now()).await
    }

    /// Coalesced sweep for UI and scheduler triggers.
    ///
    /// Returns `Ok(None)` when the request was throttled or a sweep for the
    /// user already ran within the coalescing interval.
    pub async fn request_sweep(&self, user_id: UserId) -> AppResult<Option<SweepReport>> {
        self.request_sweep_at(user_id, Timestamp::now()).await
    }

    pub async fn request_sweep_at(
        &self,
        user_id: UserId,
        now: Timestamp,
    ) -> AppResult<Option<SweepReport>> {
        if !self.limiter.check(&format!("alert_sweep:{}", user_id), now) {
            tracing::debug!(user_id, "Sweep request throttled");
            return Ok(None);
        }

        if !self.coalescer.try_begin(user_id, now) {
            tracing::debug!(user_id, "Sweep already ran within interval");
            return Ok(None);
        }

        match self.sweep.run(user_id, now).await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                // let the next trigger retry instead of waiting out the interval
                if e.is_transient() {
                    self.coalescer.forget(user_id);
                }
                Err(e)
            }
        }
    }

    /// Sweep driven by the periodic scheduler.
    ///
    /// The cron cadence already spaces these runs, so no coalescing or
    /// throttling applies. The run is recorded so on-demand triggers right
    /// after it are suppressed.
    pub async fn scheduled_sweep_at(&self, user_id: UserId, now: Timestamp) -> AppResult<SweepReport> {
        let report = self.sweep.run(user_id, now).await?;
        self.coalescer.record(user_id, now);
        Ok(report)
    }

    /// Users the periodic scheduler should consider.
    pub async fn alert_users(&self) -> AppResult<Vec<UserId>> {
        self.users.list_alert_users().await
    }

    /// Drops coalescer entries older than two intervals, expired limiter
    /// windows and idle per-user sweep locks.
    pub fn housekeeping(&self, now: Timestamp) -> Housekeeping {
        let cutoff = now - self.coalescer.interval() * 2;
        let stats = Housekeeping {
            purged: self.coalescer.purge_older_than(cutoff),
            cleaned: self.limiter.cleanup(now),
            unlocked: self.sweep.prune_idle_locks(),
        };
        tracing::debug!(
            purged = stats.purged,
            cleaned = stats.cleaned,
            unlocked = stats.unlocked,
            "Alert housekeeping"
        );
        stats
    }
}
