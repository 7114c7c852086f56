//! In-process store implementations.
//!
//! Used for tests and dry runs. Each store can be switched into a failing
//! state to exercise the error paths of the alert sweep.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::models::{
    AlertChannel, AlertLedgerEntry, Job, JobId, Notification, NotificationSettings,
    PreferenceModel, UserId,
};
use crate::repositories::traits::{
    DeduplicationLedger, JobStore, NotificationSink, PreferenceStore, UserDirectory,
};

fn unavailable(operation: &str) -> AppError {
    AppError::store(operation, anyhow::anyhow!("in-memory store marked unavailable"))
}

// ============================================================================
// Jobs
// ============================================================================

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: DashMap<JobId, (Job, bool)>,
    unavailable: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        let store = Self::new();
        for job in jobs {
            store.insert(job);
        }
        store
    }

    /// Inserts or replaces an open job.
    pub fn insert(&self, job: Job) {
        self.jobs.insert(job.id, (job, true));
    }

    /// Marks a job closed; closed jobs are never listed.
    pub fn close(&self, job_id: JobId) {
        if let Some(mut entry) = self.jobs.get_mut(&job_id) {
            entry.1 = false;
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn open_jobs(&self, keep: impl Fn(&Job) -> bool) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| entry.value().1 && keep(&entry.value().0))
            .map(|entry| entry.value().0.clone())
            .collect();
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then_with(|| a.id.cmp(&b.id)));
        jobs
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn list_jobs(&self, posted_since: Timestamp) -> AppResult<Vec<Job>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("list jobs in window"));
        }
        Ok(self.open_jobs(|job| job.posted_at >= posted_since))
    }

    async fn list_all_open_jobs(&self) -> AppResult<Vec<Job>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("list open jobs"));
        }
        Ok(self.open_jobs(|_| true))
    }
}

// ============================================================================
// Preferences
// ============================================================================

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    preferences: DashMap<UserId, PreferenceModel>,
    settings: DashMap<UserId, NotificationSettings>,
    unavailable: AtomicBool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_preferences(&self, user_id: UserId, prefs: PreferenceModel) {
        self.preferences.insert(user_id, prefs);
    }

    pub fn set_settings(&self, user_id: UserId, settings: NotificationSettings) {
        self.settings.insert(user_id, settings);
    }

    /// Makes preference reads fail with `PreferenceUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get_preferences(&self, user_id: UserId) -> AppResult<Option<PreferenceModel>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::PreferenceUnavailable { user_id });
        }
        Ok(self.preferences.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> AppResult<Option<NotificationSettings>> {
        Ok(self.settings.get(&user_id).map(|entry| *entry.value()))
    }
}

#[async_trait]
impl UserDirectory for InMemoryPreferenceStore {
    async fn list_alert_users(&self) -> AppResult<Vec<UserId>> {
        let users: BTreeSet<UserId> = self
            .preferences
            .iter()
            .map(|entry| *entry.key())
            .filter(|user_id| {
                self.settings
                    .get(user_id)
                    .is_none_or(|settings| settings.alerts_enabled)
            })
            .collect();
        Ok(users.into_iter().collect())
    }
}

// ============================================================================
// Ledger
// ============================================================================

/// Ledger keyed by (user, job, channel). Insertion goes through the map's
/// entry lock, so concurrent writers of one triple see exactly one success.
#[derive(Default)]
pub struct InMemoryLedger {
    entries: DashMap<(UserId, JobId, AlertChannel), Timestamp>,
    unavailable: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, user_id: UserId, job_id: JobId, channel: AlertChannel) -> bool {
        self.entries.contains_key(&(user_id, job_id, channel))
    }

    /// Snapshot of all entries ordered by user, job, then channel.
    pub fn entries(&self) -> Vec<AlertLedgerEntry> {
        let mut entries: Vec<AlertLedgerEntry> = self
            .entries
            .iter()
            .map(|entry| {
                let (user_id, job_id, channel) = *entry.key();
                AlertLedgerEntry {
                    user_id,
                    job_id,
                    channel,
                    sent_at: *entry.value(),
                }
            })
            .collect();
        entries.sort_by_key(|entry| (entry.user_id, entry.job_id, entry.channel));
        entries
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeduplicationLedger for InMemoryLedger {
    async fn has_fired(&self, user_id: UserId, job_id: JobId, channel: AlertChannel) -> AppResult<bool> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("check alert ledger"));
        }
        Ok(self.contains(user_id, job_id, channel))
    }

    async fn record_fired(
        &self,
        user_id: UserId,
        job_id: JobId,
        channel: AlertChannel,
        sent_at: Timestamp,
    ) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(unavailable("record alert"));
        }
        match self.entries.entry((user_id, job_id, channel)) {
            Entry::Occupied(_) => Err(AppError::DuplicateLedgerEntry {
                user_id,
                job_id,
                channel,
            }),
            Entry::Vacant(slot) => {
                slot.insert(sent_at);
                Ok(())
            }
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Default)]
pub struct InMemoryNotificationSink {
    created: Mutex<Vec<Notification>>,
    failing_jobs: DashSet<JobId>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every notification whose metadata names `job_id`.
    pub fn fail_for_job(&self, job_id: JobId) {
        self.failing_jobs.insert(job_id);
    }

    pub fn recover_job(&self, job_id: JobId) {
        self.failing_jobs.remove(&job_id);
    }

    /// Notifications created so far, in creation order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn create_notification(&self, notification: &Notification) -> AppResult<()> {
        let job_id = notification
            .metadata
            .get("job_id")
            .and_then(|value| value.as_i64())
            .unwrap_or_default();

        if self.failing_jobs.contains(&job_id) {
            return Err(AppError::NotificationSinkFailure {
                user_id: notification.user_id,
                job_id,
                source: anyhow::anyhow!("notification sink rejected job {}", job_id),
            });
        }

        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }
}
