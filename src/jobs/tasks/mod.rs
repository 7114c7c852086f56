mod alert_sweep;

pub use alert_sweep::{AlertSweepTask, SweepPassSummary};
