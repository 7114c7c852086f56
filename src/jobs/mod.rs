//! Periodic background work: cron scheduling, timeouts and overlap control.

pub mod error;
pub mod executor;
pub mod scheduler;
pub mod tasks;
pub mod types;

pub use error::{JobError, JobResult};
pub use executor::{ConcurrencyTracker, JobExecutor};
pub use scheduler::JobScheduler;
pub use tasks::{AlertSweepTask, SweepPassSummary};
pub use types::{JobContext, JobTask};
