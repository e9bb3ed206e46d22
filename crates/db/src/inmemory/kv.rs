//! In-memory [`KvStore`].

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{sync::RwLock, time::Instant};
use tracing::trace;

use super::errors::InMemoryError;
use crate::{errors::DbResult, kv::KvStore};

/// A value together with the instant it stops being visible.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory key-value store with per-key expiry.
///
/// Expiry is measured with [`tokio::time::Instant`] so tests can move time forward with
/// [`tokio::time::advance`]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,

    /// When set, every operation fails with [`InMemoryError::Unavailable`].
    unavailable: Arc<AtomicBool>,
}

impl InMemoryKvStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail (or succeed again), to simulate an unreachable
    /// backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(InMemoryError::Unavailable.into());
        }

        Ok(())
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.ensure_available()?;

        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()> {
        self.ensure_available()?;

        trace!(action = "trying to acquire wlock on kv entries", %key);
        let mut entries = self.entries.write().await;
        trace!(event = "acquired wlock on kv entries", %key);

        let now = Instant::now();
        // opportunistic cleanup so the map does not grow with dead identities
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );

        Ok(())
    }

    async fn delete(&self, key: &str) -> DbResult<bool> {
        self.ensure_available()?;

        let now = Instant::now();
        Ok(self
            .entries
            .write()
            .await
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }
}
