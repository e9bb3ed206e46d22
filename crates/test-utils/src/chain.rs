//! A scriptable [`ChainClient`].

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use alloy_primitives::{keccak256, Address, TxHash};
use async_trait::async_trait;
use drip_chain_client::{
    client::ChainClient,
    errors::{BroadcastError, ChainClientError, ChainResult},
    tx::DripTx,
};
use drip_primitives::types::{ChainId, Network};

/// Operator address reported by [`MockChainClient`].
pub const MOCK_OPERATOR: Address = Address::repeat_byte(0x0f);

/// Gas price returned for networks with no explicit price.
pub const MOCK_GAS_PRICE: u128 = 1_000_000_000;

/// A call received by [`MockChainClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainCall {
    /// `gas_price` on a network.
    GasPrice(ChainId),

    /// `account_nonce` for an account on a network.
    AccountNonce(ChainId, Address),

    /// `broadcast` of a transaction on a network.
    Broadcast(ChainId, DripTx),
}

impl ChainCall {
    /// The network the call was made against.
    pub const fn chain_id(&self) -> ChainId {
        match self {
            ChainCall::GasPrice(chain_id)
            | ChainCall::AccountNonce(chain_id, _)
            | ChainCall::Broadcast(chain_id, _) => *chain_id,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    gas_prices: HashMap<ChainId, u128>,
    account_nonces: HashMap<ChainId, u64>,
    failing_gas_price: HashSet<ChainId>,
    failing_account_nonce: HashSet<ChainId>,
    failing_broadcast: HashSet<ChainId>,
    calls: Vec<ChainCall>,
}

/// In-process stand-in for every network at once.
///
/// Networks answer with whatever was set up for them (zero nonce and [`MOCK_GAS_PRICE`] by
/// default) until told to fail. Broadcasts never change the reported account nonce, mirroring a
/// node whose pool has not yet mined anything. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockChainClient {
    state: Arc<Mutex<State>>,
}

impl MockChainClient {
    /// Creates a client where every network is healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic hash reported for the broadcast of `nonce` on `chain_id`.
    pub fn tx_hash_for(chain_id: ChainId, nonce: u64) -> TxHash {
        keccak256(format!("{chain_id}:{nonce}"))
    }

    /// The operator address.
    pub const fn operator_address(&self) -> Address {
        MOCK_OPERATOR
    }

    /// Sets the gas price `chain_id` suggests.
    pub fn set_gas_price(&self, chain_id: ChainId, gas_price: u128) {
        self.state().gas_prices.insert(chain_id, gas_price);
    }

    /// Sets the operator's transaction count on `chain_id`.
    pub fn set_account_nonce(&self, chain_id: ChainId, nonce: u64) {
        self.state().account_nonces.insert(chain_id, nonce);
    }

    /// Makes every broadcast on `chain_id` fail.
    pub fn fail_broadcasts_on(&self, chain_id: ChainId) {
        self.state().failing_broadcast.insert(chain_id);
    }

    /// Makes every gas price query on `chain_id` fail.
    pub fn fail_gas_price_on(&self, chain_id: ChainId) {
        self.state().failing_gas_price.insert(chain_id);
    }

    /// Makes every nonce query on `chain_id` fail.
    pub fn fail_account_nonce_on(&self, chain_id: ChainId) {
        self.state().failing_account_nonce.insert(chain_id);
    }

    /// Clears every failure set up for `chain_id`.
    pub fn recover(&self, chain_id: ChainId) {
        let mut state = self.state();
        state.failing_broadcast.remove(&chain_id);
        state.failing_gas_price.remove(&chain_id);
        state.failing_account_nonce.remove(&chain_id);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ChainCall> {
        self.state().calls.clone()
    }

    /// Every transaction broadcast so far, in order, including failed ones.
    pub fn broadcasts(&self) -> Vec<DripTx> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                ChainCall::Broadcast(_, tx) => Some(tx.clone()),
                _ => None,
            })
            .collect()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock state must not be poisoned")
    }
}

fn rpc_failure(chain_id: ChainId, method: &'static str) -> BroadcastError {
    BroadcastError::new(
        chain_id,
        ChainClientError::Rpc {
            method,
            reason: "node is down".to_string(),
        },
    )
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn operator_address(&self) -> Address {
        MOCK_OPERATOR
    }

    async fn gas_price(&self, network: &Network) -> ChainResult<u128> {
        let mut state = self.state();
        state.calls.push(ChainCall::GasPrice(network.chain_id));

        if state.failing_gas_price.contains(&network.chain_id) {
            return Err(rpc_failure(network.chain_id, "eth_gasPrice"));
        }

        Ok(state
            .gas_prices
            .get(&network.chain_id)
            .copied()
            .unwrap_or(MOCK_GAS_PRICE))
    }

    async fn account_nonce(&self, network: &Network, account: Address) -> ChainResult<u64> {
        let mut state = self.state();
        state
            .calls
            .push(ChainCall::AccountNonce(network.chain_id, account));

        if state.failing_account_nonce.contains(&network.chain_id) {
            return Err(rpc_failure(network.chain_id, "eth_getTransactionCount"));
        }

        Ok(state
            .account_nonces
            .get(&network.chain_id)
            .copied()
            .unwrap_or_default())
    }

    async fn broadcast(&self, network: &Network, tx: &DripTx) -> ChainResult<TxHash> {
        let mut state = self.state();
        state
            .calls
            .push(ChainCall::Broadcast(network.chain_id, tx.clone()));

        if state.failing_broadcast.contains(&network.chain_id) {
            return Err(rpc_failure(network.chain_id, "eth_sendRawTransaction"));
        }

        Ok(Self::tx_hash_for(network.chain_id, tx.nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{network, random_address};

    #[tokio::test]
    async fn records_calls_and_scripted_failures() {
        let chain = MockChainClient::new();
        let goerli = network(5);
        chain.set_gas_price(5, 7);
        chain.fail_broadcasts_on(5);

        assert_eq!(chain.gas_price(&goerli).await, Ok(7));
        assert_eq!(chain.account_nonce(&goerli, MOCK_OPERATOR).await, Ok(0));

        let tx = DripTx::new(&goerli, random_address(), 7, 0);
        let err = chain.broadcast(&goerli, &tx).await.unwrap_err();
        assert_eq!(err.chain_id, 5);

        chain.recover(5);
        assert_eq!(
            chain.broadcast(&goerli, &tx).await,
            Ok(MockChainClient::tx_hash_for(5, 0))
        );

        assert_eq!(chain.calls().len(), 4);
        assert_eq!(chain.broadcasts(), vec![tx.clone(), tx]);
    }
}
