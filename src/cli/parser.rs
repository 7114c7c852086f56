//! CLI argument parsing with clap
//!
//! Defines the command-line interface: global flags, commands and their
//! documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Preference-based job matching and alert sweeps
#[derive(Parser, Debug)]
#[command(name = "job-alerts")]
#[command(about = "Preference-based job matching and alert sweeps")]
#[command(long_about = "
job-alerts ranks open jobs against saved user preferences and sends
deduplicated job alerts. Alerts are swept per user, either on demand or by
the built-in cron scheduler, and every (user, job, channel) fires at most once.

EXAMPLES:
    # Apply database migrations
    job-alerts migrate

    # Run the periodic alert scheduler
    job-alerts schedule

    # Sweep alerts for one user right away
    job-alerts sweep --user 42 --force

    # Show the ranked feed for a user
    job-alerts feed --user 42 --limit 20

    # Validate configuration and database connectivity
    job-alerts --env production check

For more information about configuration options, see config/default.toml.
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered `config/` directory.
    /// `JOB_ALERTS_*` environment variables still override its values.
    ///
    /// Example: --config /etc/job-alerts/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` is layered over `default.toml`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Database migration operations
    ///
    /// Examples:
    ///   job-alerts migrate                    # Apply all pending migrations
    ///   job-alerts migrate --dry-run          # Show pending migrations without applying
    ///   job-alerts migrate --rollback 3       # Rollback the last 3 migrations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to rollback (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },

    /// Run one alert sweep for a user
    ///
    /// Without --force the request goes through the same throttle and
    /// coalescing as UI triggers.
    Sweep {
        /// User to sweep
        #[arg(short, long, value_name = "ID", value_parser = super::validation::validate_user_id)]
        user: i64,

        /// Bypass throttling and coalescing
        #[arg(long)]
        force: bool,
    },

    /// Print the ranked job feed
    Feed {
        /// Rank against this user's preferences; newest first when omitted
        #[arg(short, long, value_name = "ID", value_parser = super::validation::validate_user_id)]
        user: Option<i64>,

        /// Maximum number of jobs to print
        #[arg(short, long, value_name = "N", default_value_t = 20, value_parser = super::validation::validate_limit)]
        limit: usize,
    },

    /// Run the periodic alert scheduler until interrupted
    Schedule {
        /// Run a single pass over all users and exit
        #[arg(long)]
        once: bool,

        /// Users swept concurrently, overriding `scheduler.max_concurrent_sweeps`
        #[arg(long, value_name = "N", value_parser = super::validation::validate_concurrency)]
        concurrency: Option<usize>,

        /// Log level override for the scheduler process
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,
    },

    /// Validate configuration and database connectivity, then exit
    Check,
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Checks argument combinations clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(Commands::Migrate {
            dry_run: true,
            rollback: Some(_),
        }) = self.command
        {
            return Err("Cannot use --dry-run and --rollback together".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }

    /// Level implied by --verbose/--quiet and a per-command override, if any
    pub fn log_level_override(&self) -> Option<LogLevel> {
        if let Some(Commands::Schedule {
            log_level: Some(level),
            ..
        }) = self.command
        {
            return Some(level);
        }
        if self.verbose {
            Some(LogLevel::Debug)
        } else if self.quiet {
            Some(LogLevel::Error)
        } else {
            None
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["job-alerts", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["job-alerts"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
        assert!(cli.log_level_override().is_none());
    }

    #[test]
    fn test_sweep_command() {
        let cli = Cli::try_parse_from(["job-alerts", "sweep", "--user", "42", "--force"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Sweep {
                user: 42,
                force: true
            })
        );
    }

    #[test]
    fn test_sweep_requires_positive_user() {
        assert!(Cli::try_parse_from(["job-alerts", "sweep"]).is_err());
        assert!(Cli::try_parse_from(["job-alerts", "sweep", "--user", "0"]).is_err());
    }

    #[test]
    fn test_feed_defaults() {
        let cli = Cli::try_parse_from(["job-alerts", "feed"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Feed {
                user: None,
                limit: 20
            })
        );
    }

    #[test]
    fn test_schedule_log_level_wins_over_verbose() {
        let cli = Cli::try_parse_from([
            "job-alerts",
            "--verbose",
            "schedule",
            "--log-level",
            "warn",
        ])
        .unwrap();
        assert_eq!(cli.log_level_override(), Some(LogLevel::Warn));
    }

    #[test]
    fn test_migrate_command() {
        let cli = Cli::try_parse_from(["job-alerts", "migrate", "--dry-run"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Migrate {
                dry_run: true,
                rollback: None
            })
        );
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["job-alerts", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_env_alias() {
        let cli = Cli::try_parse_from(["job-alerts", "--env", "prod", "check"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
        assert_eq!(cli.command, Some(Commands::Check));
    }
}
