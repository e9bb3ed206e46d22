//! [`ChainClient`] over Ethereum JSON-RPC.

use std::{
    collections::HashMap,
    fmt,
    future::{Future, IntoFuture},
    sync::Arc,
    time::Duration,
};

use alloy::{
    eips::eip2718::Encodable2718,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::{Provider, RootProvider},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use drip_primitives::types::{ChainId, Network};
use tokio::sync::RwLock;
use tracing::{debug, info, trace};

use crate::{
    client::ChainClient,
    errors::{BroadcastError, ChainClientError, ChainResult},
    tx::DripTx,
};

/// Connects an HTTP provider to `url`.
pub(crate) fn http_provider(url: &str) -> Result<RootProvider, ChainClientError> {
    let parsed = url.parse().map_err(|e| ChainClientError::InvalidRpcUrl {
        url: url.to_string(),
        reason: format!("{e}"),
    })?;

    Ok(RootProvider::new_http(parsed))
}

/// Awaits `fut`, turning both a timeout and an RPC error into a [`ChainClientError`].
pub(crate) async fn timed<T, E, F>(
    method: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, ChainClientError>
where
    E: fmt::Display,
    F: Future<Output = Result<T, E>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ChainClientError::Timeout { method, timeout })?
        .map_err(|e| ChainClientError::Rpc {
            method,
            reason: e.to_string(),
        })
}

/// Signs drips with a local operator key and submits them over HTTP JSON-RPC.
///
/// One provider is kept per network endpoint and reused across claims; clones share them.
#[derive(Clone)]
pub struct EvmChainClient {
    operator: Address,
    wallet: EthereumWallet,
    timeout: Duration,
    providers: Arc<RwLock<HashMap<(ChainId, String), RootProvider>>>,
}

impl fmt::Debug for EvmChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmChainClient")
            .field("operator", &self.operator)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl EvmChainClient {
    /// Creates a client that signs with `signer` and bounds every RPC call by `timeout`.
    pub fn new(signer: PrivateKeySigner, timeout: Duration) -> Self {
        let operator = signer.address();
        info!(%operator, ?timeout, "initialized chain client");

        Self {
            operator,
            wallet: EthereumWallet::from(signer),
            timeout,
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn provider(&self, network: &Network) -> ChainResult<RootProvider> {
        let key = (network.chain_id, network.rpc_url.clone());
        if let Some(provider) = self.providers.read().await.get(&key) {
            return Ok(provider.clone());
        }

        trace!(action = "trying to acquire wlock on providers", chain_id = %network.chain_id);
        let mut providers = self.providers.write().await;
        trace!(event = "acquired wlock on providers", chain_id = %network.chain_id);

        if let Some(provider) = providers.get(&key) {
            return Ok(provider.clone());
        }

        let provider = http_provider(&network.rpc_url)
            .map_err(|cause| BroadcastError::new(network.chain_id, cause))?;
        debug!(chain_id = %network.chain_id, rpc_url = %network.rpc_url, "connected provider");
        providers.insert(key, provider.clone());

        Ok(provider)
    }
}

#[async_trait]
impl ChainClient for EvmChainClient {
    fn operator_address(&self) -> Address {
        self.operator
    }

    async fn gas_price(&self, network: &Network) -> ChainResult<u128> {
        let provider = self.provider(network).await?;

        timed("eth_gasPrice", self.timeout, provider.get_gas_price())
            .await
            .map_err(|cause| BroadcastError::new(network.chain_id, cause))
    }

    async fn account_nonce(&self, network: &Network, account: Address) -> ChainResult<u64> {
        let provider = self.provider(network).await?;

        timed(
            "eth_getTransactionCount",
            self.timeout,
            provider.get_transaction_count(account).into_future(),
        )
        .await
        .map_err(|cause| BroadcastError::new(network.chain_id, cause))
    }

    async fn broadcast(&self, network: &Network, tx: &DripTx) -> ChainResult<TxHash> {
        let provider = self.provider(network).await?;

        let envelope = tx
            .to_request(self.operator)
            .build(&self.wallet)
            .await
            .map_err(|e| {
                BroadcastError::new(network.chain_id, ChainClientError::Signing(e.to_string()))
            })?;
        let raw = envelope.encoded_2718();

        let pending = timed(
            "eth_sendRawTransaction",
            self.timeout,
            provider.send_raw_transaction(&raw),
        )
        .await
        .map_err(|cause| BroadcastError::new(network.chain_id, cause))?;

        Ok(*pending.tx_hash())
    }
}
