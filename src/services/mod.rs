//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the CLI and scheduler.

pub mod alerts;
mod feed;
mod rate_limiter;

pub use alerts::{AlertService, AlertSweep, Housekeeping, SweepCoalescer, SweepReport, SweepSkip};
pub use feed::FeedService;
pub use rate_limiter::RateLimiter;

use std::sync::Arc;

use crate::config::Settings;
use crate::repositories::{
    DeduplicationLedger, JobStore, NotificationSink, PreferenceStore, Repositories, UserDirectory,
};

/// Store handles the services are built from.
///
/// Lets the same wiring run against Postgres repositories or in-memory stores.
#[derive(Clone)]
pub struct Stores {
    pub preferences: Arc<dyn PreferenceStore>,
    pub users: Arc<dyn UserDirectory>,
    pub jobs: Arc<dyn JobStore>,
    pub ledger: Arc<dyn DeduplicationLedger>,
    pub sink: Arc<dyn NotificationSink>,
}

impl From<Repositories> for Stores {
    fn from(repos: Repositories) -> Self {
        let preferences = Arc::new(repos.preferences);
        Self {
            preferences: preferences.clone(),
            users: preferences,
            jobs: Arc::new(repos.jobs),
            ledger: Arc::new(repos.alert_ledger),
            sink: Arc::new(repos.notifications),
        }
    }
}

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since every field is reference counted.
#[derive(Clone)]
pub struct Services {
    pub alerts: AlertService,
    pub feed: FeedService,
}

impl Services {
    /// Creates a new Services instance from store handles and settings.
    pub fn new(stores: Stores, settings: &Settings) -> Self {
        let sweep = AlertSweep::new(
            stores.preferences.clone(),
            stores.jobs.clone(),
            stores.ledger,
            stores.sink,
            settings.alerts.clone(),
        );
        let limiter = Arc::new(RateLimiter::from_config(&settings.rate_limit));

        Self {
            alerts: AlertService::new(sweep, stores.users, limiter),
            feed: FeedService::new(stores.preferences, stores.jobs),
        }
    }
}
