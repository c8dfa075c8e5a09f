//! Shared mapping from pool and Diesel failures onto port error types.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{AssetRepositoryError, UserPersistenceError};

use super::pool::PoolError;

/// Coarse classification shared by every repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    Connection(String),
    UniqueViolation(String),
    Constraint(String),
    Query(String),
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error and emit debug context for `operation`.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        _ => debug!(error = %error, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            DieselFailure::Connection(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation(info.message().to_owned())
        }
        DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::CheckViolation
            | DatabaseErrorKind::NotNullViolation,
            info,
        ) => DieselFailure::Constraint(info.message().to_owned()),
        DieselError::BrokenTransactionManager => {
            DieselFailure::Connection("transaction manager is broken".to_owned())
        }
        other => DieselFailure::Query(other.to_string()),
    }
}

/// Map pool errors onto the asset port.
pub(crate) fn map_asset_pool_error(error: PoolError) -> AssetRepositoryError {
    AssetRepositoryError::connection(pool_error_message(error))
}

/// Map Diesel errors onto the asset port.
pub(crate) fn map_asset_diesel_error(
    error: DieselError,
    operation: &'static str,
) -> AssetRepositoryError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => AssetRepositoryError::connection(message),
        DieselFailure::UniqueViolation(message) | DieselFailure::Constraint(message) => {
            AssetRepositoryError::constraint(message)
        }
        DieselFailure::Query(message) => AssetRepositoryError::query(message),
    }
}

/// Map pool errors onto the user port.
pub(crate) fn map_user_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_error_message(error))
}

/// Map Diesel errors onto the user port. Unique violations are reported as
/// duplicate usernames because `username` is the only unique column.
pub(crate) fn map_user_diesel_error(
    error: DieselError,
    operation: &'static str,
    username: &str,
) -> UserPersistenceError {
    match classify_diesel_error(error, operation) {
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::UniqueViolation(_) => UserPersistenceError::duplicate_username(username),
        DieselFailure::Constraint(message) | DieselFailure::Query(message) => {
            UserPersistenceError::query(message)
        }
    }
}

#[cfg(test)]
mod tests {
    //! Classification of representative Diesel failures.
    use rstest::rstest;

    use super::*;

    #[derive(Debug)]
    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
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
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(message)))
    }

    #[rstest]
    #[case(
        db_error(DatabaseErrorKind::ClosedConnection, "gone"),
        DieselFailure::Connection("gone".into())
    )]
    #[case(
        db_error(DatabaseErrorKind::UniqueViolation, "dup"),
        DieselFailure::UniqueViolation("dup".into())
    )]
    #[case(
        db_error(DatabaseErrorKind::CheckViolation, "price"),
        DieselFailure::Constraint("price".into())
    )]
    #[case(
        db_error(DatabaseErrorKind::ForeignKeyViolation, "owner"),
        DieselFailure::Constraint("owner".into())
    )]
    #[case(DieselError::NotFound, DieselFailure::Query("Record not found".into()))]
    fn classifies_errors(#[case] error: DieselError, #[case] expected: DieselFailure) {
        assert_eq!(classify_diesel_error(error, "test"), expected);
    }

    #[rstest]
    fn unique_violation_is_duplicate_username() {
        let err = map_user_diesel_error(
            db_error(DatabaseErrorKind::UniqueViolation, "users_username_key"),
            "create user",
            "ada",
        );
        assert_eq!(err, UserPersistenceError::duplicate_username("ada"));
    }

    #[rstest]
    fn check_violation_is_asset_constraint() {
        let err = map_asset_diesel_error(
            db_error(DatabaseErrorKind::CheckViolation, "assets_price_check"),
            "create asset",
        );
        assert_eq!(err, AssetRepositoryError::constraint("assets_price_check"));
    }

    #[rstest]
    fn pool_errors_are_connection_failures() {
        assert_eq!(
            map_asset_pool_error(PoolError::checkout("timed out")),
            AssetRepositoryError::connection("timed out")
        );
        assert_eq!(
            map_user_pool_error(PoolError::build("bad url")),
            UserPersistenceError::connection("bad url")
        );
    }
}
