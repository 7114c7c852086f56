use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting database errors to structured AppError variants.
///
/// Unique violations become `AppError::Duplicate` so repositories can tell a
/// lost insert race apart from an unavailable store. Everything else is a
/// store failure.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// # Arguments
    /// * `error` - The Diesel error to convert
    /// * `operation` - Description of the database operation that failed
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info, operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::store(operation, other),
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: Box<dyn diesel::result::DatabaseErrorInformation + Send + Sync>,
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint_name = info.constraint_name();

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                match ConstraintParser::parse_unique_violation(message, constraint_name) {
                    Some((entity, field, value)) => AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                    None => AppError::store(
                        operation,
                        anyhow::Error::msg(format!("Unique constraint violation: {}", message)),
                    ),
                }
            }
            DatabaseErrorKind::ClosedConnection => AppError::store(
                operation,
                anyhow::Error::msg(format!("Connection closed: {}", message)),
            ),
            _ => AppError::store(
                operation,
                anyhow::Error::msg(format!("Database error: {}", message)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    struct MockDatabaseErrorInfo {
        message: String,
        constraint_name: Option<String>,
    }

    impl diesel::result::DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find job");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_ledger_unique_violation() {
        let info = MockDatabaseErrorInfo {
            message: "duplicate key value violates unique constraint \"alert_ledger_user_id_job_id_channel_key\"\nDETAIL: Key (user_id, job_id, channel)=(7, 42, in_app) already exists.".to_string(),
            constraint_name: Some("alert_ledger_user_id_job_id_channel_key".to_string()),
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(info));

        match DatabaseErrorConverter::convert_diesel_error(error, "record alert") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "alert_ledger");
                assert_eq!(field, "user_id, job_id, channel");
                assert_eq!(value, "7, 42, in_app");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_closed_connection_is_store_failure() {
        let info = MockDatabaseErrorInfo {
            message: "server closed the connection unexpectedly".to_string(),
            constraint_name: None,
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new(info));

        let result = DatabaseErrorConverter::convert_diesel_error(error, "list jobs");
        match result {
            AppError::StoreUnavailable { operation, .. } => assert_eq!(operation, "list jobs"),
            other => panic!("Expected StoreUnavailable, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_unique_violation_is_store_failure() {
        let info = MockDatabaseErrorInfo {
            message: "unique violation".to_string(),
            constraint_name: None,
        };
        let error = DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(info));

        let result = DatabaseErrorConverter::convert_diesel_error(error, "insert");
        assert!(matches!(result, AppError::StoreUnavailable { .. }));
    }
}
