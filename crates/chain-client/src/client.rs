//! The interface the dispatcher uses to act on a network.

use std::fmt::Debug;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;
use drip_primitives::types::Network;

use crate::{errors::ChainResult, tx::DripTx};

/// Signs and submits drips, and answers the two questions needed to build one.
///
/// Implementations hold the operator key; callers never see it.
#[async_trait]
pub trait ChainClient: Debug + Send + Sync {
    /// Address drips are sent from.
    fn operator_address(&self) -> Address;

    /// Gas price the network currently suggests, in wei.
    async fn gas_price(&self, network: &Network) -> ChainResult<u128>;

    /// Number of transactions `account` has sent on `network`.
    async fn account_nonce(&self, network: &Network, account: Address) -> ChainResult<u64>;

    /// Signs `tx` with the operator key and submits it.
    ///
    /// Returns once the node has accepted the transaction into its pool; inclusion is not
    /// awaited.
    async fn broadcast(&self, network: &Network, tx: &DripTx) -> ChainResult<TxHash>;
}
