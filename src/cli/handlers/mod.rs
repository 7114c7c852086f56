//! Command handlers for CLI operations
//!
//! Keeps command execution apart from parsing and validation.

pub mod check;
pub mod feed;
pub mod migrate;
pub mod schedule;
pub mod sweep;

pub use check::CheckCommandHandler;
pub use feed::FeedCommandHandler;
pub use migrate::MigrateCommandHandler;
pub use schedule::ScheduleCommandHandler;
pub use sweep::SweepCommandHandler;
