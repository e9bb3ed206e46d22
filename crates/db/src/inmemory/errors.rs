//! In-memory store errors.

use thiserror::Error;

/// Errors that can occur when interacting with an in-memory store.
#[derive(Debug, Error)]
pub enum InMemoryError {
    /// The store was switched offline to simulate an unreachable backend.
    #[error("store unavailable")]
    Unavailable,
}
