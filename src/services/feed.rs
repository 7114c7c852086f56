//! Ranked job feed for one user.

use std::sync::Arc;

use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::matching::{MatchResult, rank_jobs};
use crate::models::UserId;
use crate::repositories::{JobStore, PreferenceStore};

/// Feed service ranking open jobs against stored preferences
#[derive(Clone)]
pub struct FeedService {
    preferences: Arc<dyn PreferenceStore>,
    jobs: Arc<dyn JobStore>,
}

impl FeedService {
    pub fn new(preferences: Arc<dyn PreferenceStore>, jobs: Arc<dyn JobStore>) -> Self {
        Self { preferences, jobs }
    }

    /// Ranks every open job for `user_id`, or unranked-by-preference when
    /// no user is given.
    ///
    /// Unreadable preferences degrade to the unfiltered feed. The ledger is
    /// never consulted.
    pub async fn feed(&self, user_id: Option<UserId>, now: Timestamp) -> AppResult<Vec<MatchResult>> {
        let prefs = match user_id {
            Some(user_id) => match self.preferences.get_preferences(user_id).await {
                Ok(prefs) => prefs,
                Err(AppError::PreferenceUnavailable { .. }) => {
                    tracing::warn!(user_id, "Preferences unavailable, serving unfiltered feed");
                    None
                }
                Err(e) => return Err(e),
            },
            None => None,
        };

        let jobs = self.jobs.list_all_open_jobs().await?;
        let ranked = rank_jobs(&jobs, prefs.as_ref(), now);

        tracing::debug!(
            user_id = ?user_id,
            open_jobs = jobs.len(),
            ranked = ranked.len(),
            "Feed ranked"
        );

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmploymentType, Job, PreferenceModel, RemoteMode};
    use crate::repositories::memory::{InMemoryJobStore, InMemoryPreferenceStore};
    use jiff::SignedDuration;

    fn now() -> Timestamp {
        "2026-03-10T12:00:00Z".parse().unwrap()
    }

    fn job(id: i64, title: &str, days_ago: i64) -> Job {
        Job {
            id,
            title: title.to_string(),
            description: String::new(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            employment_type: EmploymentType::Contract,
            remote_mode: RemoteMode::Remote,
            experience_level: None,
            posted_at: now() - SignedDuration::from_hours(days_ago * 24),
        }
    }

    fn service() -> (FeedService, Arc<InMemoryPreferenceStore>) {
        let prefs = Arc::new(InMemoryPreferenceStore::new());
        let jobs = Arc::new(InMemoryJobStore::with_jobs([
            job(1, "Backend Engineer", 30),
            job(2, "Product Designer", 30),
            job(3, "Product Designer", 1),
        ]));
        (FeedService::new(prefs.clone(), jobs), prefs)
    }

    #[tokio::test]
    async fn test_feed_with_preferences_filters_zero_scores() {
        let (service, prefs) = service();
        prefs.set_preferences(
            1,
            PreferenceModel {
                roles: ["backend".to_string()].into_iter().collect(),
                ..Default::default()
            },
        );

        let feed = service.feed(Some(1), now()).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|r| r.job.id).collect();

        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_feed_without_user_keeps_everything() {
        let (service, _) = service();

        let feed = service.feed(None, now()).await.unwrap();

        assert_eq!(feed.len(), 3);
        assert!(feed.iter().all(|r| r.score == 0));
    }

    #[tokio::test]
    async fn test_unavailable_preferences_degrade_to_unfiltered() {
        let (service, prefs) = service();
        prefs.set_unavailable(true);

        let feed = service.feed(Some(1), now()).await.unwrap();

        assert_eq!(feed.len(), 3);
    }
}
