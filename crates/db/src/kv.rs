//! The key-value store that holds short-lived shared state.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;

use crate::errors::DbResult;

/// A shared key-value store where every entry expires after its own time-to-live.
///
/// Expired entries behave exactly like absent ones.
#[async_trait]
pub trait KvStore: Debug + Send + Sync {
    /// Returns the value stored under `key` if it exists and has not expired.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value, for `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()>;

    /// Removes `key`, returning whether a live entry was removed.
    async fn delete(&self, key: &str) -> DbResult<bool>;
}
