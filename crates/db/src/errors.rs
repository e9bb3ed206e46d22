//! Errors returned by every store in this crate.

use thiserror::Error;

use crate::{inmemory::errors::InMemoryError, persistent::errors::StorageError};

/// Unified error type for the stores in this crate.
#[derive(Debug, Error)]
pub enum DbError {
    /// The SQLite store failed.
    #[error("sqlite: {0}")]
    Storage(#[from] StorageError),

    /// The in-memory store failed.
    #[error("memory: {0}")]
    InMemory(#[from] InMemoryError),
}

/// Result alias for store operations.
pub type DbResult<T> = Result<T, DbError>;
