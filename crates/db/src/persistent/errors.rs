//! Persistent database errors.

use thiserror::Error;

use super::constants::{SQLITE_BUSY, SQLITE_LOCKED};

/// Errors that can occur when interacting with the database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An error occurred when interacting with the SQLite database.
    #[error("sqlite: {0}")]
    Driver(#[from] sqlx::Error),

    /// A stored value could not be converted back into its domain type.
    #[error("conversion: {0}")]
    MismatchedTypes(String),
}

impl StorageError {
    /// Whether retrying the operation might succeed.
    ///
    /// Lock contention and connectivity problems are transient. Constraint violations, bad data
    /// and bad queries are not.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Driver(sqlx::Error::Database(err)) => {
                err.code().is_some_and(|code| is_contention_code(&code))
            }
            StorageError::Driver(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            StorageError::MismatchedTypes(_) => false,
        }
    }
}

/// Whether a SQLite result code, possibly extended, reports a busy or locked database.
fn is_contention_code(code: &str) -> bool {
    code.parse::<i32>()
        .is_ok_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn only_lock_contention_is_retried() {
        // SQLITE_BUSY, SQLITE_BUSY_SNAPSHOT, SQLITE_LOCKED, SQLITE_LOCKED_SHAREDCACHE
        for code in ["5", "517", "6", "262"] {
            assert!(is_contention_code(code), "{code} must be retried");
        }

        // SQLITE_CONSTRAINT, SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_READONLY, garbage
        for code in ["19", "1555", "8", "busy"] {
            assert!(!is_contention_code(code), "{code} must not be retried");
        }
    }

    #[test]
    fn connectivity_errors_are_transient() {
        assert!(StorageError::Driver(sqlx::Error::PoolTimedOut).is_transient());
        assert!(StorageError::Driver(sqlx::Error::Io(io::Error::other("reset"))).is_transient());
        assert!(!StorageError::Driver(sqlx::Error::RowNotFound).is_transient());
        assert!(!StorageError::MismatchedTypes("chain_id".to_string()).is_transient());
    }
}
