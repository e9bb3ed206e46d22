//! Per-network cache of the operator's next nonce.

use std::{sync::Arc, time::Duration};

use drip_chain_client::client::ChainClient;
use drip_db::kv::KvStore;
use drip_primitives::types::{ChainId, Network};
use tracing::{debug, trace};

use crate::errors::{DripError, InfrastructureError};

/// Key under which the next nonce for `chain_id` is cached.
pub fn nonce_key(chain_id: ChainId) -> String {
    format!("nonce-{chain_id}")
}

/// Shared, expiring record of the next nonce to use on each network.
///
/// The chain is only asked when nothing is cached. A drip reserves its nonce by caching the one
/// after it *before* broadcasting, so a concurrent claim on the same network picks up the next
/// nonce even while the first broadcast is still in flight. Two claims that both miss the cache
/// can still derive the same nonce; the loser's broadcast fails and its eviction resynchronizes
/// the cache with the chain.
#[derive(Debug, Clone)]
pub struct NonceCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl NonceCache {
    /// Creates a cache over `store` whose reservations live for `ttl`.
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Returns the cached next nonce for `chain_id`, if any.
    pub async fn cached(&self, chain_id: ChainId) -> Result<Option<u64>, InfrastructureError> {
        let key = nonce_key(chain_id);
        let Some(value) = self.store.get(&key).await? else {
            return Ok(None);
        };

        value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| InfrastructureError::CorruptCacheEntry { key, value })
    }

    /// Returns the nonce the next drip on `network` should use.
    ///
    /// On a cache miss this is the operator account's transaction count as reported by the chain;
    /// the answer is not written back.
    pub async fn get_nonce(
        &self,
        network: &Network,
        chain: &dyn ChainClient,
    ) -> Result<u64, DripError> {
        if let Some(nonce) = self.cached(network.chain_id).await? {
            trace!(chain_id = %network.chain_id, %nonce, "nonce cache hit");
            return Ok(nonce);
        }

        let nonce = chain
            .account_nonce(network, chain.operator_address())
            .await?;
        debug!(chain_id = %network.chain_id, %nonce, "nonce cache miss, using chain nonce");

        Ok(nonce)
    }

    /// Records that `used` has been taken on `chain_id`, so the next drip uses `used + 1`.
    pub async fn reserve_next(
        &self,
        chain_id: ChainId,
        used: u64,
    ) -> Result<(), InfrastructureError> {
        let next = used.saturating_add(1);
        self.store
            .set_ex(&nonce_key(chain_id), &next.to_string(), self.ttl)
            .await?;
        trace!(%chain_id, %next, "reserved nonce");

        Ok(())
    }

    /// Forgets the cached nonce for `chain_id` so the next drip asks the chain.
    pub async fn evict(&self, chain_id: ChainId) -> Result<(), InfrastructureError> {
        let removed = self.store.delete(&nonce_key(chain_id)).await?;
        debug!(%chain_id, %removed, "evicted cached nonce");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use drip_db::{errors::DbError, inmemory::kv::InMemoryKvStore};
    use drip_primitives::constants::NONCE_TTL;
    use drip_test_utils::{
        chain::{ChainCall, MockChainClient},
        fixtures::network,
    };

    use super::*;

    fn setup() -> (InMemoryKvStore, NonceCache, MockChainClient) {
        let store = InMemoryKvStore::new();
        let cache = NonceCache::new(Arc::new(store.clone()), NONCE_TTL);
        let chain = MockChainClient::new();

        (store, cache, chain)
    }

    #[tokio::test]
    async fn cold_cache_reads_chain_without_writing() {
        let (store, cache, chain) = setup();
        let goerli = network(5);
        chain.set_account_nonce(5, 41);

        assert_eq!(cache.get_nonce(&goerli, &chain).await.unwrap(), 41);
        assert_eq!(
            chain.calls(),
            vec![ChainCall::AccountNonce(5, chain.operator_address())]
        );
        assert!(
            store.get(&nonce_key(5)).await.unwrap().is_none(),
            "a cache miss must not populate the cache"
        );
    }

    #[tokio::test]
    async fn reservation_is_served_from_cache() {
        let (_store, cache, chain) = setup();
        let goerli = network(5);
        chain.set_account_nonce(5, 3);

        cache.reserve_next(5, 7).await.unwrap();

        assert_eq!(cache.get_nonce(&goerli, &chain).await.unwrap(), 8);
        assert!(chain.calls().is_empty(), "a cache hit must not touch the chain");
    }

    #[tokio::test]
    async fn eviction_goes_back_to_chain() {
        let (_store, cache, chain) = setup();
        let goerli = network(5);
        chain.set_account_nonce(5, 3);

        cache.reserve_next(5, 7).await.unwrap();
        cache.evict(5).await.unwrap();

        assert_eq!(cache.get_nonce(&goerli, &chain).await.unwrap(), 3);
        assert_eq!(chain.calls().len(), 1);

        // evicting an absent entry is fine
        cache.evict(5).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn reservation_expires() {
        let (_store, cache, chain) = setup();
        let goerli = network(5);
        chain.set_account_nonce(5, 3);

        cache.reserve_next(5, 7).await.unwrap();
        tokio::time::advance(NONCE_TTL - Duration::from_secs(1)).await;
        assert_eq!(cache.get_nonce(&goerli, &chain).await.unwrap(), 8);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            cache.get_nonce(&goerli, &chain).await.unwrap(),
            3,
            "an expired reservation must fall back to the chain"
        );
    }

    #[tokio::test]
    async fn networks_have_independent_sequences() {
        let (_store, cache, chain) = setup();
        chain.set_account_nonce(42, 100);

        cache.reserve_next(5, 7).await.unwrap();

        assert_eq!(cache.get_nonce(&network(5), &chain).await.unwrap(), 8);
        assert_eq!(cache.get_nonce(&network(42), &chain).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn unavailable_store_fails_loudly() {
        let (store, cache, chain) = setup();
        chain.set_account_nonce(5, 3);
        store.set_unavailable(true);

        let err = cache.get_nonce(&network(5), &chain).await.unwrap_err();
        assert!(
            matches!(
                err,
                DripError::Infrastructure(InfrastructureError::Store(DbError::InMemory(_)))
            ),
            "must not fall back to any nonce when the store is down, got {err:?}"
        );
        assert!(chain.calls().is_empty());

        assert!(cache.reserve_next(5, 3).await.is_err());
        assert!(cache.evict(5).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_entry_is_not_a_miss() {
        let (store, cache, chain) = setup();
        store
            .set_ex(&nonce_key(5), "eight", NONCE_TTL)
            .await
            .unwrap();

        let err = cache.get_nonce(&network(5), &chain).await.unwrap_err();
        assert!(matches!(
            err,
            DripError::Infrastructure(InfrastructureError::CorruptCacheEntry { ref value, .. })
                if value == "eight"
        ));
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn chain_failure_is_attributed_to_network() {
        let (_store, cache, chain) = setup();
        chain.fail_account_nonce_on(80001);

        let err = cache.get_nonce(&network(80001), &chain).await.unwrap_err();
        assert!(matches!(err, DripError::Chain(ref e) if e.chain_id == 80001));
    }
}
