//! Job alerts: the per-user sweep and the coalescing layer around it.

mod coalescer;
mod service;
mod sweep;

pub use coalescer::SweepCoalescer;
pub use service::{AlertService, Housekeeping};
pub use sweep::{AlertSweep, NOTIFICATION_TITLE_MAX_CHARS, SweepReport, SweepSkip};
