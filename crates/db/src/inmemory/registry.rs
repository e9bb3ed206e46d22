//! In-memory [`NetworkRegistry`].

use std::sync::Arc;

use async_trait::async_trait;
use drip_primitives::types::Network;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{errors::DbResult, registry::NetworkRegistry};

/// In-memory network registry. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNetworkRegistry {
    networks: Arc<RwLock<Vec<Network>>>,
}

impl InMemoryNetworkRegistry {
    /// Creates a registry holding `networks` in the given order.
    pub fn new(networks: Vec<Network>) -> Self {
        Self {
            networks: Arc::new(RwLock::new(networks)),
        }
    }
}

#[async_trait]
impl NetworkRegistry for InMemoryNetworkRegistry {
    async fn networks(&self) -> DbResult<Vec<Network>> {
        Ok(self.networks.read().await.clone())
    }

    async fn replace_networks(&self, networks: &[Network]) -> DbResult<()> {
        let mut current = self.networks.write().await;
        *current = networks.to_vec();
        debug!(count = current.len(), "replaced network registry");

        Ok(())
    }

    async fn append_networks(&self, networks: &[Network]) -> DbResult<()> {
        let mut current = self.networks.write().await;
        for network in networks {
            match current
                .iter_mut()
                .find(|existing| existing.chain_id == network.chain_id)
            {
                Some(existing) => *existing = network.clone(),
                None => current.push(network.clone()),
            }
        }
        debug!(count = current.len(), "appended to network registry");

        Ok(())
    }
}
