//! Errors returned when talking to a network.

use std::time::Duration;

use drip_primitives::types::ChainId;
use thiserror::Error;

/// What went wrong with a single JSON-RPC interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainClientError {
    /// The configured endpoint is not a usable URL.
    #[error("invalid rpc url {url}: {reason}")]
    InvalidRpcUrl {
        /// The offending URL.
        url: String,

        /// Why it could not be parsed.
        reason: String,
    },

    /// The node did not answer in time.
    #[error("{method} timed out after {timeout:?}")]
    Timeout {
        /// JSON-RPC method that was called.
        method: &'static str,

        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The node answered with an error or could not be reached.
    #[error("{method} failed: {reason}")]
    Rpc {
        /// JSON-RPC method that was called.
        method: &'static str,

        /// Error reported by the transport or the node.
        reason: String,
    },

    /// The transaction could not be signed.
    #[error("failed to sign transaction: {0}")]
    Signing(String),
}

/// Failure of any call a [`ChainClient`](crate::client::ChainClient) makes on behalf of a network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("chain {chain_id}: {cause}")]
pub struct BroadcastError {
    /// The network the call was made against.
    pub chain_id: ChainId,

    /// What went wrong.
    #[source]
    pub cause: ChainClientError,
}

impl BroadcastError {
    /// Attributes `cause` to the network `chain_id`.
    pub const fn new(chain_id: ChainId, cause: ChainClientError) -> Self {
        Self { chain_id, cause }
    }
}

/// Result alias for [`ChainClient`](crate::client::ChainClient) calls.
pub type ChainResult<T> = Result<T, BroadcastError>;

/// Failure to look up an ENS name, as opposed to the name having no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to resolve {name}: {cause}")]
pub struct ResolveError {
    /// The name being resolved.
    pub name: String,

    /// What went wrong.
    #[source]
    pub cause: ChainClientError,
}
