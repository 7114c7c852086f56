//! Sweep command handler

use crate::error::AppResult;
use crate::models::UserId;
use crate::services::{AlertService, SweepReport};

/// Runs one alert sweep from the command line
pub struct SweepCommandHandler {
    alerts: AlertService,
}

impl SweepCommandHandler {
    pub fn new(alerts: AlertService) -> Self {
        Self { alerts }
    }

    /// `force` bypasses throttling and coalescing. Returns `None` when the
    /// request was suppressed.
    pub async fn execute(&self, user_id: UserId, force: bool) -> AppResult<Option<SweepReport>> {
        let report = if force {
            Some(self.alerts.run_alert_sweep(user_id).await?)
        } else {
            self.alerts.request_sweep(user_id).await?
        };

        match &report {
            Some(report) => println!("{}", render_report(user_id, report)),
            None => println!(
                "Sweep for user {} suppressed: throttled or already ran recently (use --force)",
                user_id
            ),
        }

        Ok(report)
    }
}

fn render_report(user_id: UserId, report: &SweepReport) -> String {
    if let Some(reason) = report.skipped {
        return format!("User {}: sweep skipped ({:?})", user_id, reason);
    }
    format!(
        "User {}: {} matched, {} notification(s) created, {} already notified, {} sink failure(s)",
        user_id,
        report.matched,
        report.notifications_created,
        report.already_notified,
        report.sink_failures
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use jiff::{SignedDuration, Timestamp};

    use crate::config::AlertsConfig;
    use crate::models::{EmploymentType, Job, PreferenceModel, RemoteMode};
    use crate::repositories::memory::{
        InMemoryJobStore, InMemoryLedger, InMemoryNotificationSink, InMemoryPreferenceStore,
    };
    use crate::services::{AlertSweep, RateLimiter, SweepSkip};

    fn handler() -> (SweepCommandHandler, Arc<InMemoryPreferenceStore>) {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let jobs = Arc::new(InMemoryJobStore::with_jobs([Job {
            id: 1,
            title: "Backend Engineer".to_string(),
            description: String::new(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            employment_type: EmploymentType::FullTime,
            remote_mode: RemoteMode::Remote,
            experience_level: None,
            posted_at: Timestamp::now() - SignedDuration::from_hours(2),
        }]));
        let sweep = AlertSweep::new(
            prefs.clone(),
            jobs,
            Arc::new(InMemoryLedger::new()),
            Arc::new(InMemoryNotificationSink::new()),
            AlertsConfig::default(),
        );
        let limiter = Arc::new(RateLimiter::new(SignedDuration::from_secs(60), 10));
        let alerts = AlertService::new(sweep, prefs.clone(), limiter);
        (SweepCommandHandler::new(alerts), prefs)
    }

    #[tokio::test]
    async fn test_forced_sweeps_are_never_coalesced() {
        let (handler, prefs) = handler();
        prefs.set_preferences(
            5,
            PreferenceModel {
                roles: ["backend".to_string()].into_iter().collect(),
                ..Default::default()
            },
        );

        let first = handler.execute(5, true).await.unwrap().unwrap();
        let second = handler.execute(5, true).await.unwrap().unwrap();

        assert_eq!(first.notifications_created, 1);
        assert_eq!(second.notifications_created, 0);
        assert_eq!(second.already_notified, 1);
    }

    #[tokio::test]
    async fn test_unforced_sweep_coalesces() {
        let (handler, prefs) = handler();
        prefs.set_preferences(5, PreferenceModel::default());

        assert!(handler.execute(5, false).await.unwrap().is_some());
        assert!(handler.execute(5, false).await.unwrap().is_none());
    }

    #[test]
    fn test_render_skipped_report() {
        let report = SweepReport {
            skipped: Some(SweepSkip::AlertsDisabled),
            ..Default::default()
        };
        assert_eq!(
            render_report(3, &report),
            "User 3: sweep skipped (AlertsDisabled)"
        );
    }
}
