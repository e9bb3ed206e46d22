//! A [`NameResolver`] backed by a fixed table.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use alloy_primitives::Address;
use async_trait::async_trait;
use drip_chain_client::{
    ens::NameResolver,
    errors::{ChainClientError, ResolveError},
};

/// Resolves names from a table filled in by the test. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct StaticNameResolver {
    records: Arc<RwLock<HashMap<String, Address>>>,
    failing: Arc<AtomicBool>,
    lookups: Arc<AtomicUsize>,
}

impl StaticNameResolver {
    /// Creates a resolver that knows no names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an address record for `name`.
    pub fn insert(&self, name: &str, address: Address) {
        self.records
            .write()
            .expect("records must not be poisoned")
            .insert(name.to_string(), address);
    }

    /// Makes every lookup fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups made so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameResolver for StaticNameResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ResolveError {
                name: name.to_string(),
                cause: ChainClientError::Rpc {
                    method: "eth_call",
                    reason: "node is down".to_string(),
                },
            });
        }

        Ok(self
            .records
            .read()
            .expect("records must not be poisoned")
            .get(name)
            .copied())
    }
}
