//! Target networks and the parameters needed to drip on them.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{ARBITRUM_GAS_LIMIT, ARBITRUM_RINKEBY_CHAIN_ID, DEFAULT_GAS_LIMIT};

/// EIP-155 chain identifier.
pub type ChainId = u64;

/// A test network the faucet drips on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// The EIP-155 chain id, also used to sign transactions for this network.
    pub chain_id: ChainId,

    /// JSON-RPC endpoint that accepts signed raw transactions.
    pub rpc_url: String,

    /// Address of the faucet contract exposing `drip(address)`.
    pub faucet_address: Address,

    /// Gas limit for drips on this network, overriding the built-in ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,

    /// Notice shown to claimants, e.g. that a token is temporarily not dripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,

    /// Whether the faucet contract on this network has run dry and is waiting for a refill.
    ///
    /// Informational only: claims still drip on depleted networks.
    #[serde(default)]
    pub depleted: bool,
}

impl Network {
    /// Creates a network with the default gas ceiling, no disclaimer and not depleted.
    pub fn new(chain_id: ChainId, rpc_url: impl Into<String>, faucet_address: Address) -> Self {
        Self {
            chain_id,
            rpc_url: rpc_url.into(),
            faucet_address,
            gas_limit: None,
            disclaimer: None,
            depleted: false,
        }
    }

    /// Returns the gas limit to sign drips with.
    ///
    /// An explicit override wins; otherwise networks known to need more gas get their minimum and
    /// everything else gets [`DEFAULT_GAS_LIMIT`].
    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
            .unwrap_or_else(|| default_gas_limit(self.chain_id))
    }

    /// Checks that the entry can be used to dispatch drips.
    pub fn validate(&self) -> Result<(), InvalidNetwork> {
        let rpc_url = self.rpc_url.trim();
        if rpc_url.is_empty() {
            return Err(InvalidNetwork::MissingRpcUrl(self.chain_id));
        }

        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(InvalidNetwork::UnsupportedRpcUrl(
                self.chain_id,
                self.rpc_url.clone(),
            ));
        }

        if self.faucet_address.is_zero() {
            return Err(InvalidNetwork::ZeroFaucetAddress(self.chain_id));
        }

        if self.gas_limit == Some(0) {
            return Err(InvalidNetwork::ZeroGasLimit(self.chain_id));
        }

        Ok(())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain {} (faucet {})", self.chain_id, self.faucet_address)
    }
}

/// Returns the built-in gas ceiling for a chain.
pub const fn default_gas_limit(chain_id: ChainId) -> u64 {
    match chain_id {
        ARBITRUM_RINKEBY_CHAIN_ID => ARBITRUM_GAS_LIMIT,
        _ => DEFAULT_GAS_LIMIT,
    }
}

/// Checks a whole registry listing: every entry must be valid and chain ids must be unique.
pub fn validate_networks(networks: &[Network]) -> Result<(), InvalidNetwork> {
    for (idx, network) in networks.iter().enumerate() {
        network.validate()?;

        if networks[..idx]
            .iter()
            .any(|other| other.chain_id == network.chain_id)
        {
            return Err(InvalidNetwork::DuplicateChainId(network.chain_id));
        }
    }

    Ok(())
}

/// Reasons a network entry is refused by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidNetwork {
    /// The entry has no RPC endpoint.
    #[error("network {0} has no rpc url")]
    MissingRpcUrl(ChainId),

    /// The RPC endpoint is not an http(s) URL.
    #[error("network {0} has an unsupported rpc url: {1}")]
    UnsupportedRpcUrl(ChainId, String),

    /// The faucet contract address is the zero address.
    #[error("network {0} has a zero faucet address")]
    ZeroFaucetAddress(ChainId),

    /// The gas limit override is zero.
    #[error("network {0} has a zero gas limit")]
    ZeroGasLimit(ChainId),

    /// The same chain id appears more than once.
    #[error("network {0} is listed more than once")]
    DuplicateChainId(ChainId),
}
