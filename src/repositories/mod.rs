//! Repository layer for data access operations.
//!
//! The alert engine only talks to the traits in [`traits`]; Postgres
//! repositories and the in-memory stores in [`memory`] both implement them.

mod alert_ledger_repo;
mod job_repo;
pub mod memory;
mod notification_repo;
mod preference_repo;
pub mod traits;

pub use alert_ledger_repo::AlertLedgerRepository;
pub use job_repo::JobRepository;
pub use notification_repo::NotificationRepository;
pub use preference_repo::PreferenceRepository;
pub use traits::{DeduplicationLedger, JobStore, NotificationSink, PreferenceStore, UserDirectory};

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Since `AsyncDbPool` uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct Repositories {
    pub jobs: JobRepository,
    pub preferences: PreferenceRepository,
    pub alert_ledger: AlertLedgerRepository,
    pub notifications: NotificationRepository,
}

impl Repositories {
    /// Creates a new Repositories instance with all repositories initialized.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            jobs: JobRepository::new(pool.clone()),
            preferences: PreferenceRepository::new(pool.clone()),
            alert_ledger: AlertLedgerRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }
}
