//! CLI argument validation functions
//!
//! Custom value parsers for arguments that need more than clap's type checks.

use std::fs;
use std::path::PathBuf;

/// Largest feed page printed by `feed --limit`
const MAX_FEED_LIMIT: usize = 500;

/// Upper bound for `schedule --concurrency`
const MAX_CONCURRENCY: usize = 256;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Validate rollback steps is a positive number
pub fn validate_rollback_steps(steps_str: &str) -> Result<u32, String> {
    let steps: u32 = steps_str.parse().map_err(|_| {
        format!(
            "Rollback steps must be a valid positive number, got: '{}'",
            steps_str
        )
    })?;

    if steps == 0 {
        return Err("Rollback steps must be greater than 0".to_string());
    }

    // Reasonable upper limit to prevent accidental mass rollbacks
    if steps > 100 {
        return Err("Rollback steps cannot exceed 100 for safety reasons".to_string());
    }

    Ok(steps)
}

/// Validate a user identifier is a positive integer
pub fn validate_user_id(id_str: &str) -> Result<i64, String> {
    let id: i64 = id_str
        .trim()
        .parse()
        .map_err(|_| format!("User id must be a number, got: '{}'", id_str))?;

    if id <= 0 {
        return Err(format!("User id must be positive, got: {}", id));
    }

    Ok(id)
}

pub fn validate_limit(limit_str: &str) -> Result<usize, String> {
    parse_bounded(limit_str, "Limit", MAX_FEED_LIMIT)
}

pub fn validate_concurrency(value_str: &str) -> Result<usize, String> {
    parse_bounded(value_str, "Concurrency", MAX_CONCURRENCY)
}

fn parse_bounded(value_str: &str, what: &str, max: usize) -> Result<usize, String> {
    let value: usize = value_str
        .parse()
        .map_err(|_| format!("{} must be a valid positive number, got: '{}'", what, value_str))?;

    if value == 0 || value > max {
        return Err(format!("{} must be between 1 and {}, got: {}", what, max, value));
    }

    Ok(value)
}
