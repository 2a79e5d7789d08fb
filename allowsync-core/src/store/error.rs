//! Remote store error types

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors from the shared SQLite store.
///
/// Two conditions matter to callers: the store is unreachable (the pass
/// aborts, records already applied remain applied) or a single write
/// violated a constraint (only that record is dropped).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened, connected to, or read.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A single write was rejected by a table constraint.
    #[error("constraint violation: {0}")]
    Constraint(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _)
                if code.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(err.to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_classification() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("NOT NULL constraint failed".to_string()),
        );
        assert!(matches!(StoreError::from(err), StoreError::Constraint(_)));
    }

    #[test]
    fn test_other_sqlite_errors_are_unavailable() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
    }
}
