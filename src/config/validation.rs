//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    AlertsConfig, DatabaseConfig, FileSettings, LoggerSettings, RateLimitConfig, SchedulerConfig,
    Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Longest alert window accepted, in days
const MAX_WINDOW_DAYS: u32 = 365;

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must not be empty and must use a PostgreSQL scheme
    /// - Max and min connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - At least one of console and file output must be enabled
    /// - If file logging is enabled, path must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()
    }
}

impl AlertsConfig {
    /// Validate alert configuration
    ///
    /// # Validation Rules
    /// - Window must be between 1 and 365 days
    /// - Link base must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(ConfigError::ValidationError {
                field: "alerts.window_days".to_string(),
                message: format!(
                    "Alert window must be between 1 and {} days, got {}.",
                    MAX_WINDOW_DAYS, self.window_days
                ),
            });
        }

        if self.link_base.trim().is_empty() {
            return Err(ConfigError::validation(
                "alerts.link_base",
                "Link base is required to build alert links.",
            ));
        }

        Ok(())
    }
}

impl SchedulerConfig {
    /// Validate scheduler configuration
    ///
    /// The cron expression is only checked when the scheduler is enabled;
    /// the scheduler itself rejects malformed fields at registration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_sweeps == 0 {
            return Err(ConfigError::validation(
                "scheduler.max_concurrent_sweeps",
                "At least one concurrent sweep must be allowed.",
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "scheduler.timeout_seconds",
                "Sweep timeout must be greater than 0 seconds.",
            ));
        }

        // seconds-first syntax, optional trailing year
        let fields = self.cron.split_whitespace().count();
        if self.enabled && !(6..=7).contains(&fields) {
            return Err(ConfigError::ValidationError {
                field: "scheduler.cron".to_string(),
                message: format!(
                    "Invalid cron expression '{}': expected 6 or 7 fields, got {}.",
                    self.cron, fields
                ),
            });
        }

        Ok(())
    }
}

impl RateLimitConfig {
    /// Validate rate limit configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_secs == 0 {
            return Err(ConfigError::validation(
                "rate_limit.window_secs",
                "Rate limit window must be greater than 0 seconds.",
            ));
        }

        if self.max_requests == 0 {
            return Err(ConfigError::validation(
                "rate_limit.max_requests",
                "Rate limit must allow at least one request per window.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.logger.validate()?;
        self.alerts.validate()?;
        self.scheduler.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }
}
