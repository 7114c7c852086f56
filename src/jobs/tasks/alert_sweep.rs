use async_trait::async_trait;
use futures::{StreamExt, stream};
use jiff::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::jobs::types::{JobContext, JobTask};
use crate::models::UserId;
use crate::services::AlertService;

/// Outcome of one scheduled pass over every alert user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepPassSummary {
    pub users: usize,
    pub swept: usize,
    pub failed: usize,
    pub notifications_created: usize,
}

/// Periodic task sweeping every user with alerts enabled
#[derive(Clone)]
pub struct AlertSweepTask {
    alerts: AlertService,
    max_concurrent: usize,
}

impl std::fmt::Debug for AlertSweepTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertSweepTask")
            .field("max_concurrent", &self.max_concurrent)
            .finish_non_exhaustive()
    }
}

impl AlertSweepTask {
    pub const NAME: &'static str = "alert_sweep";

    pub fn new(alerts: AlertService, max_concurrent: usize) -> Self {
        Self {
            alerts,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Sweeps all alert users as of `now`, at most `max_concurrent` at a time.
    ///
    /// The cron cadence is the per-user interval here, so sweeps bypass the
    /// on-demand coalescer. A failing user is logged and counted; the
    /// remaining users still run.
    pub async fn run_pass(&self, ctx: &JobContext, now: Timestamp) -> AppResult<SweepPassSummary> {
        let users = self.alerts.alert_users().await?;
        let mut summary = SweepPassSummary {
            users: users.len(),
            ..Default::default()
        };

        let results: Vec<(UserId, AppResult<_>)> = stream::iter(users)
            .take_until(ctx.cancellation_token.cancelled())
            .map(|user_id| async move { (user_id, self.alerts.scheduled_sweep_at(user_id, now).await) })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for (user_id, result) in results {
            match result {
                Ok(report) => {
                    summary.swept += 1;
                    summary.notifications_created += report.notifications_created;
                }
                Err(e) => {
                    tracing::warn!(user_id, error = %e, transient = e.is_transient(), "User sweep failed");
                    summary.failed += 1;
                }
            }
        }

        let housekeeping = self.alerts.housekeeping(now);
        tracing::info!(
            users = summary.users,
            swept = summary.swept,
            failed = summary.failed,
            notifications_created = summary.notifications_created,
            purged = housekeeping.purged,
            cleaned = housekeeping.cleaned,
            unlocked = housekeeping.unlocked,
            "Alert sweep pass finished"
        );

        Ok(summary)
    }
}

#[async_trait]
impl JobTask for AlertSweepTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn execute(&self, ctx: JobContext) -> AppResult<()> {
        self.run_pass(&ctx, Timestamp::now()).await.map(|_| ())
    }

    fn description(&self) -> Option<String> {
        Some(format!(
            "Sweep alerts for every enabled user, {} at a time",
            self.max_concurrent
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use jiff::SignedDuration;
    use tokio_util::sync::CancellationToken;

    use crate::config::AlertsConfig;
    use crate::models::{EmploymentType, Job, NotificationSettings, PreferenceModel, RemoteMode};
    use crate::repositories::memory::{
        InMemoryJobStore, InMemoryLedger, InMemoryNotificationSink, InMemoryPreferenceStore,
    };
    use crate::services::{AlertSweep, RateLimiter};

    fn at(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    fn backend_prefs() -> PreferenceModel {
        PreferenceModel {
            roles: ["backend".to_string()].into_iter().collect(),
            ..Default::default()
        }
    }

    struct Fixture {
        task: AlertSweepTask,
        prefs: Arc<InMemoryPreferenceStore>,
        jobs: Arc<InMemoryJobStore>,
        sink: Arc<InMemoryNotificationSink>,
    }

    fn fixture() -> Fixture {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let jobs = Arc::new(InMemoryJobStore::with_jobs([Job {
            id: 10,
            title: "Backend Engineer".to_string(),
            description: String::new(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            employment_type: EmploymentType::FullTime,
            remote_mode: RemoteMode::Remote,
            experience_level: None,
            posted_at: at("2026-03-09T00:00:00Z"),
        }]));
        let sink = Arc::new(InMemoryNotificationSink::new());
        let sweep = AlertSweep::new(
            prefs.clone(),
            jobs.clone(),
            Arc::new(InMemoryLedger::new()),
            sink.clone(),
            AlertsConfig::default(),
        );
        let limiter = Arc::new(RateLimiter::new(SignedDuration::from_secs(60), 100));
        let alerts = AlertService::new(sweep, prefs.clone(), limiter);

        Fixture {
            task: AlertSweepTask::new(alerts, 2),
            prefs,
            jobs,
            sink,
        }
    }

    fn ctx() -> JobContext {
        JobContext::new(AlertSweepTask::NAME, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_pass_sweeps_every_enabled_user() {
        let f = fixture();
        for user_id in 1..=3 {
            f.prefs.set_preferences(user_id, backend_prefs());
        }
        f.prefs.set_settings(
            3,
            NotificationSettings {
                alerts_enabled: false,
                ..Default::default()
            },
        );

        let summary = f.task.run_pass(&ctx(), at("2026-03-10T12:00:00Z")).await.unwrap();

        assert_eq!(summary.users, 2);
        assert_eq!(summary.swept, 2);
        assert_eq!(summary.notifications_created, 2);
        assert_eq!(f.sink.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_pass_creates_nothing_new() {
        let f = fixture();
        f.prefs.set_preferences(1, backend_prefs());

        f.task.run_pass(&ctx(), at("2026-03-10T12:00:00Z")).await.unwrap();
        let summary = f.task.run_pass(&ctx(), at("2026-03-10T12:05:00Z")).await.unwrap();

        assert_eq!(summary.swept, 1);
        assert_eq!(summary.notifications_created, 0);
        assert_eq!(f.sink.len(), 1);
    }

    #[tokio::test]
    async fn test_hourly_pass_firing_early_within_the_second_still_sweeps() {
        let f = fixture();
        f.prefs.set_preferences(1, backend_prefs());
        f.task.run_pass(&ctx(), at("2026-03-10T12:00:00.500Z")).await.unwrap();

        f.jobs.insert(Job {
            id: 11,
            title: "Backend Developer".to_string(),
            description: String::new(),
            company: "Initech".to_string(),
            location: "Hamburg".to_string(),
            employment_type: EmploymentType::Contract,
            remote_mode: RemoteMode::Remote,
            experience_level: None,
            posted_at: at("2026-03-10T12:30:00Z"),
        });
        let summary = f.task.run_pass(&ctx(), at("2026-03-10T13:00:00.200Z")).await.unwrap();

        assert_eq!(summary.swept, 1);
        assert_eq!(summary.notifications_created, 1);
        assert_eq!(f.sink.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_pass_sweeps_nobody() {
        let f = fixture();
        f.prefs.set_preferences(1, backend_prefs());
        let ctx = ctx();
        ctx.cancellation_token.cancel();

        let summary = f.task.run_pass(&ctx, at("2026-03-10T12:00:00Z")).await.unwrap();

        assert_eq!(summary.users, 1);
        assert_eq!(summary.swept, 0);
        assert!(f.sink.is_empty());
    }
}
