//! One alert sweep for one user.
//!
//! The sweep loads the user's preferences, lists the jobs posted inside the
//! alert window, keeps those passing every declared field filter and, per
//! channel, notifies each job the ledger has not seen yet.
//!
//! A ledger entry is written only after the sink confirmed the notification.
//! If the sink fails the job stays eligible for the next sweep.

use std::sync::Arc;

use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::config::AlertsConfig;
use crate::error::{AppError, AppResult};
use crate::matching::{MatchResult, RuleHits, score_job};
use crate::models::{AlertChannel, Notification, NotificationSettings, UserId};
use crate::repositories::{DeduplicationLedger, JobStore, NotificationSink, PreferenceStore};

/// Why a sweep finished without looking at any job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepSkip {
    NoPreferences,
    AlertsDisabled,
    PreferencesUnavailable,
}

/// Counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Notifications the sink confirmed during this sweep, across channels
    pub notifications_created: usize,
    /// Jobs in the window passing the field filters
    pub matched: usize,
    /// (job, channel) pairs skipped because the ledger already had them
    pub already_notified: usize,
    /// (job, channel) pairs left for the next sweep after a sink failure
    pub sink_failures: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SweepSkip>,
}

impl SweepReport {
    fn skipped(reason: SweepSkip) -> Self {
        Self {
            skipped: Some(reason),
            ..Default::default()
        }
    }
}

/// Length limit of `notifications.title`, in characters.
pub const NOTIFICATION_TITLE_MAX_CHARS: usize = 255;

/// Side-effecting alert orchestrator over the store traits.
#[derive(Clone)]
pub struct AlertSweep {
    preferences: Arc<dyn PreferenceStore>,
    jobs: Arc<dyn JobStore>,
    ledger: Arc<dyn DeduplicationLedger>,
    sink: Arc<dyn NotificationSink>,
    config: AlertsConfig,
    /// Serializes sweeps of the same user within this process
    user_locks: Arc<DashMap<UserId, Arc<Mutex<()>>>>,
}

impl AlertSweep {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        jobs: Arc<dyn JobStore>,
        ledger: Arc<dyn DeduplicationLedger>,
        sink: Arc<dyn NotificationSink>,
        config: AlertsConfig,
    ) -> Self {
        Self {
            preferences,
            jobs,
            ledger,
            sink,
            config,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &AlertsConfig {
        &self.config
    }

    /// Drops per-user locks no sweep currently holds. Returns how many were removed.
    pub fn prune_idle_locks(&self) -> usize {
        let before = self.user_locks.len();
        self.user_locks
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        before.saturating_sub(self.user_locks.len())
    }

    pub fn tracked_locks(&self) -> usize {
        self.user_locks.len()
    }

    /// Runs the sweep for `user_id` as of `now`.
    ///
    /// Missing preferences, disabled alerts and unreadable preferences end the
    /// sweep early with `Ok`. Store failures abort with `StoreUnavailable`.
    pub async fn run(&self, user_id: UserId, now: Timestamp) -> AppResult<SweepReport> {
        let lock = self.user_locks.entry(user_id).or_default().clone();
        let _guard = lock.lock().await;

        let span = tracing::info_span!("alert_sweep", user_id);
        self.run_inner(user_id, now).instrument(span).await
    }

    async fn run_inner(&self, user_id: UserId, now: Timestamp) -> AppResult<SweepReport> {
        let prefs = match self.preferences.get_preferences(user_id).await {
            Ok(Some(prefs)) => prefs,
            Ok(None) => {
                tracing::debug!("No saved preferences, nothing to sweep");
                return Ok(SweepReport::skipped(SweepSkip::NoPreferences));
            }
            Err(AppError::PreferenceUnavailable { .. }) => {
                tracing::warn!("Preferences unavailable, skipping user");
                return Ok(SweepReport::skipped(SweepSkip::PreferencesUnavailable));
            }
            Err(e) => return Err(as_store_error("load preferences", e)),
        };

        let settings = self
            .preferences
            .get_notification_settings(user_id)
            .await
            .map_err(|e| as_store_error("load notification settings", e))?
            .unwrap_or_default();

        if !settings.alerts_enabled {
            tracing::debug!("Alerts disabled, nothing to sweep");
            return Ok(SweepReport::skipped(SweepSkip::AlertsDisabled));
        }

        let since = now - SignedDuration::from_hours(i64::from(self.config.window_days) * 24);
        let window = self
            .jobs
            .list_jobs(since)
            .await
            .map_err(|e| as_store_error("list jobs in window", e))?;

        let matches: Vec<MatchResult> = window
            .iter()
            .filter(|job| RuleHits::evaluate(job, &prefs).passes_alert_filters(&prefs))
            .map(|job| score_job(job, Some(&prefs), now))
            .collect();

        let mut report = SweepReport {
            matched: matches.len(),
            ..Default::default()
        };

        for channel in self.channels(&settings) {
            for matched in &matches {
                self.deliver(user_id, matched, channel, now, &mut report)
                    .await?;
            }
        }

        tracing::info!(
            window = window.len(),
            matched = report.matched,
            notifications_created = report.notifications_created,
            already_notified = report.already_notified,
            sink_failures = report.sink_failures,
            "Alert sweep finished"
        );

        Ok(report)
    }

    /// In-app always; email only for instant delivery.
    fn channels(&self, settings: &NotificationSettings) -> Vec<AlertChannel> {
        let mut channels = vec![AlertChannel::InApp];
        if self.config.email_enabled && settings.wants_instant_email() {
            channels.push(AlertChannel::Email);
        }
        channels
    }

    async fn deliver(
        &self,
        user_id: UserId,
        matched: &MatchResult,
        channel: AlertChannel,
        now: Timestamp,
        report: &mut SweepReport,
    ) -> AppResult<()> {
        let job_id = matched.job.id;

        let fired = self
            .ledger
            .has_fired(user_id, job_id, channel)
            .await
            .map_err(|e| as_store_error("check alert ledger", e))?;
        if fired {
            report.already_notified += 1;
            return Ok(());
        }

        let notification = self.build_notification(user_id, matched, channel);
        if let Err(e) = self.sink.create_notification(&notification).await {
            tracing::warn!(job_id, %channel, error = %e, "Notification not created, job stays eligible");
            report.sink_failures += 1;
            return Ok(());
        }
        report.notifications_created += 1;

        match self.ledger.record_fired(user_id, job_id, channel, now).await {
            Ok(()) => {
                tracing::debug!(job_id, %channel, "Alert recorded");
                Ok(())
            }
            Err(AppError::DuplicateLedgerEntry { .. }) => {
                tracing::debug!(job_id, %channel, "Alert already recorded by a concurrent sweep");
                Ok(())
            }
            Err(e) => Err(as_store_error("record alert", e)),
        }
    }

    fn build_notification(
        &self,
        user_id: UserId,
        matched: &MatchResult,
        channel: AlertChannel,
    ) -> Notification {
        let job = &matched.job;
        Notification {
            user_id,
            kind: channel.notification_kind().to_string(),
            title: notification_title(&job.title),
            message: format!("{} at {} matches your job preferences.", job.title, job.company),
            link: Some(format!(
                "{}/{}",
                self.config.link_base.trim_end_matches('/'),
                job.id
            )),
            metadata: json!({
                "job_id": job.id,
                "score": matched.score,
                "reasons": matched.reasons,
                "channel": channel,
            }),
        }
    }
}

/// "New job match: {title}", cut to the column limit on a char boundary.
fn notification_title(job_title: &str) -> String {
    let title = format!("New job match: {job_title}");
    match title.char_indices().nth(NOTIFICATION_TITLE_MAX_CHARS) {
        Some((cut, _)) => title[..cut].to_string(),
        None => title,
    }
}

/// Keeps `StoreUnavailable` as is and wraps anything else under `operation`.
fn as_store_error(operation: &str, error: AppError) -> AppError {
    match error {
        AppError::StoreUnavailable { .. } => error,
        other => AppError::store(operation, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailFrequency, EmploymentType, Job, JobId, PreferenceModel, RemoteMode};
    use crate::repositories::memory::{
        InMemoryJobStore, InMemoryLedger, InMemoryNotificationSink, InMemoryPreferenceStore,
    };
    use std::collections::BTreeSet;

    struct Fixture {
        prefs: Arc<InMemoryPreferenceStore>,
        jobs: Arc<InMemoryJobStore>,
        ledger: Arc<InMemoryLedger>,
        sink: Arc<InMemoryNotificationSink>,
        sweep: AlertSweep,
    }

    fn now() -> Timestamp {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn job(id: i64, title: &str, location: &str, days_ago: i64) -> Job {
        Job {
            id,
            title: title.to_string(),
            description: String::new(),
            company: "Acme".to_string(),
            location: location.to_string(),
            employment_type: EmploymentType::FullTime,
            remote_mode: RemoteMode::Hybrid,
            experience_level: None,
            posted_at: now() - SignedDuration::from_hours(days_ago * 24),
        }
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture(jobs: Vec<Job>) -> Fixture {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let jobs = Arc::new(InMemoryJobStore::with_jobs(jobs));
        let ledger = Arc::new(InMemoryLedger::new());
        let sink = Arc::new(InMemoryNotificationSink::new());
        let sweep = AlertSweep::new(
            prefs.clone(),
            jobs.clone(),
            ledger.clone(),
            sink.clone(),
            AlertsConfig::default(),
        );
        Fixture {
            prefs,
            jobs,
            ledger,
            sink,
            sweep,
        }
    }

    #[tokio::test]
    async fn test_no_preferences_is_noop() {
        let f = fixture(vec![job(1, "Backend Engineer", "Berlin", 1)]);

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.skipped, Some(SweepSkip::NoPreferences));
        assert!(f.sink.is_empty());
        assert!(f.ledger.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_alerts_is_noop() {
        let f = fixture(vec![job(1, "Backend Engineer", "Berlin", 1)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        f.prefs.set_settings(
            1,
            NotificationSettings {
                alerts_enabled: false,
                email_frequency: EmailFrequency::Instant,
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.skipped, Some(SweepSkip::AlertsDisabled));
        assert!(f.sink.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_preferences_skip_user() {
        let f = fixture(vec![job(1, "Backend Engineer", "Berlin", 1)]);
        f.prefs.set_unavailable(true);

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.skipped, Some(SweepSkip::PreferencesUnavailable));
    }

    #[tokio::test]
    async fn test_conjunctive_filter_and_window() {
        let f = fixture(vec![
            job(1, "Backend Engineer", "Berlin", 1),
            job(2, "Backend Engineer", "Paris", 1),
            job(3, "Product Designer", "Berlin", 1),
            job(4, "Backend Engineer", "Berlin", 9),
        ]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                locations: set(&["berlin"]),
                ..Default::default()
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.matched, 1);
        assert_eq!(report.notifications_created, 1);
        assert!(f.ledger.contains(1, 1, AlertChannel::InApp));
        assert_eq!(f.ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_recency_only_job_never_alerts() {
        let f = fixture(vec![job(1, "Product Designer", "Berlin", 0)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.matched, 0);
        assert!(f.sink.is_empty());
    }

    #[tokio::test]
    async fn test_instant_email_adds_second_channel() {
        let f = fixture(vec![job(7, "Backend Engineer", "Berlin", 2)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        f.prefs.set_settings(
            1,
            NotificationSettings {
                alerts_enabled: true,
                email_frequency: EmailFrequency::Instant,
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.notifications_created, 2);
        let kinds: Vec<String> = f.sink.notifications().into_iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec!["job_alert".to_string(), "job_alert_email".to_string()]);
        assert!(f.ledger.contains(1, 7, AlertChannel::Email));
    }

    #[tokio::test]
    async fn test_daily_email_stays_in_app_only() {
        let f = fixture(vec![job(7, "Backend Engineer", "Berlin", 2)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        f.prefs.set_settings(
            1,
            NotificationSettings {
                alerts_enabled: true,
                email_frequency: EmailFrequency::Daily,
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.notifications_created, 1);
        assert!(!f.ledger.contains(1, 7, AlertChannel::Email));
    }

    #[tokio::test]
    async fn test_notification_content() {
        let f = fixture(vec![job(42, "Backend Engineer", "Berlin", 1)]);
        f.prefs.set_preferences(
            3,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );

        f.sweep.run(3, now()).await.unwrap();

        let created = f.sink.notifications();
        let notification = &created[0];
        assert_eq!(notification.user_id, 3);
        assert_eq!(notification.kind, "job_alert");
        assert!(notification.message.contains("Backend Engineer"));
        assert!(notification.message.contains("Acme"));
        assert_eq!(notification.link.as_deref(), Some("/jobs/42"));
        assert_eq!(notification.metadata["job_id"], 42);
        assert_eq!(notification.metadata["score"], 15);
        assert_eq!(notification.metadata["channel"], "in_app");
        assert_eq!(
            notification.metadata["reasons"],
            json!(["Role match", "New post"])
        );
    }

    /// Ledger where another sweep records each triple right after this one checks it.
    struct RacingLedger {
        inner: Arc<InMemoryLedger>,
    }

    #[async_trait::async_trait]
    impl DeduplicationLedger for RacingLedger {
        async fn has_fired(
            &self,
            user_id: UserId,
            job_id: JobId,
            channel: AlertChannel,
        ) -> AppResult<bool> {
            let fired = self.inner.has_fired(user_id, job_id, channel).await?;
            if !fired {
                self.inner
                    .record_fired(user_id, job_id, channel, now())
                    .await?;
            }
            Ok(fired)
        }

        async fn record_fired(
            &self,
            user_id: UserId,
            job_id: JobId,
            channel: AlertChannel,
            sent_at: Timestamp,
        ) -> AppResult<()> {
            self.inner.record_fired(user_id, job_id, channel, sent_at).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_record_is_swallowed() {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        let inner = Arc::new(InMemoryLedger::new());
        let sink = Arc::new(InMemoryNotificationSink::new());
        let sweep = AlertSweep::new(
            prefs,
            Arc::new(InMemoryJobStore::with_jobs([job(8, "Backend Engineer", "Berlin", 1)])),
            Arc::new(RacingLedger { inner: inner.clone() }),
            sink.clone(),
            AlertsConfig::default(),
        );

        let report = sweep.run(1, now()).await.unwrap();

        assert_eq!(report.notifications_created, 1);
        assert_eq!(inner.len(), 1);
        assert!(inner.contains(1, 8, AlertChannel::InApp));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_long_title_fits_notification_column() {
        let long_title = format!("Backend {}", "é".repeat(247));
        assert_eq!(long_title.chars().count(), 255);
        let f = fixture(vec![job(5, &long_title, "Berlin", 1)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.notifications_created, 1);
        let title = &f.sink.notifications()[0].title;
        assert_eq!(title.chars().count(), NOTIFICATION_TITLE_MAX_CHARS);
        assert!(title.starts_with("New job match: Backend é"));
    }

    #[test]
    fn test_short_title_is_kept_whole() {
        assert_eq!(notification_title("Backend Engineer"), "New job match: Backend Engineer");
    }

    #[tokio::test]
    async fn test_prune_idle_locks_keeps_held_ones() {
        let f = fixture(vec![]);
        f.sweep.run(1, now()).await.unwrap();
        f.sweep.run(2, now()).await.unwrap();
        assert_eq!(f.sweep.tracked_locks(), 2);

        let held = f.sweep.user_locks.entry(2).or_default().clone();
        let _guard = held.lock().await;

        assert_eq!(f.sweep.prune_idle_locks(), 1);
        assert_eq!(f.sweep.tracked_locks(), 1);
        assert!(f.sweep.user_locks.contains_key(&2));
    }

    #[tokio::test]
    async fn test_sink_failure_continues_with_other_jobs() {
        let f = fixture(vec![
            job(1, "Backend Engineer", "Berlin", 1),
            job(2, "Backend Developer", "Berlin", 1),
        ]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        f.sink.fail_for_job(1);

        let report = f.sweep.run(1, now()).await.unwrap();

        assert_eq!(report.sink_failures, 1);
        assert_eq!(report.notifications_created, 1);
        assert!(!f.ledger.contains(1, 1, AlertChannel::InApp));
        assert!(f.ledger.contains(1, 2, AlertChannel::InApp));
    }

    #[tokio::test]
    async fn test_store_failure_aborts() {
        let f = fixture(vec![job(1, "Backend Engineer", "Berlin", 1)]);
        f.prefs.set_preferences(
            1,
            PreferenceModel {
                roles: set(&["backend"]),
                ..Default::default()
            },
        );
        f.jobs.set_unavailable(true);

        let err = f.sweep.run(1, now()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));

        f.jobs.set_unavailable(false);
        f.ledger.set_unavailable(true);
        let err = f.sweep.run(1, now()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
        assert!(f.sink.is_empty());
    }
}
