use regex::Regex;
use std::sync::OnceLock;

/// Tables owned by this crate's migrations, longest names first so that
/// `alert_ledger_...` is not mistaken for a table called `alert`.
const KNOWN_TABLES: &[&str] = &[
    "notification_settings",
    "job_preferences",
    "notifications",
    "alert_ledger",
    "jobs",
];

/// Utility for parsing PostgreSQL constraint violation messages.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    table_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Matches "Key (field, field)=(value, value)" in PostgreSQL messages
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").unwrap(),
            table_name: Regex::new(r#"table "([^"]+)""#).unwrap(),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Parses a unique constraint violation into (entity, field, value).
    ///
    /// Composite keys keep their column list, e.g. the ledger key yields
    /// `("alert_ledger", "user_id, job_id, channel", "7, 42, in_app")`.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value_from_message(message);

        if let Some(entity) = constraint_name.and_then(Self::table_for_constraint) {
            return Some(match key_value {
                Some((field, value)) => (entity, field, value),
                None => (entity, Self::columns_from_constraint(constraint_name?), "duplicate_value".to_string()),
            });
        }

        let (field, value) = key_value?;
        let entity = Self::extract_table_from_message(message).unwrap_or_else(|| "resource".to_string());
        Some((entity, field, value))
    }

    /// Resolves the owning table of a constraint such as `alert_ledger_user_id_job_id_channel_key`.
    pub fn table_for_constraint(constraint_name: &str) -> Option<String> {
        KNOWN_TABLES
            .iter()
            .find(|table| {
                constraint_name
                    .strip_prefix(**table)
                    .is_some_and(|rest| rest.starts_with('_'))
            })
            .map(|table| table.to_string())
    }

    fn columns_from_constraint(constraint_name: &str) -> String {
        let table = Self::table_for_constraint(constraint_name).unwrap_or_default();
        constraint_name
            .trim_start_matches(table.as_str())
            .trim_start_matches('_')
            .trim_end_matches("_key")
            .to_string()
    }

    /// Extracts `(columns, values)` from "Key (...)=(...)".
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}
