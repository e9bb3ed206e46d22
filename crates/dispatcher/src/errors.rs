//! Errors that abort a claim.

use drip_chain_client::errors::{BroadcastError, ResolveError};
use drip_db::errors::DbError;
use thiserror::Error;

/// A failure of the faucet's own infrastructure rather than of the claimant or a network.
///
/// Any of these ends the claim with a generic server error.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// The shared key-value store or the network registry could not be used.
    #[error("store unavailable: {0}")]
    Store(#[from] DbError),

    /// A cached value is not what the faucet wrote there.
    #[error("corrupt cache entry under {key}: {value:?}")]
    CorruptCacheEntry {
        /// Key of the entry.
        key: String,

        /// What was found.
        value: String,
    },

    /// The name service could not be asked.
    #[error("name resolution failed: {0}")]
    NameResolution(#[from] ResolveError),
}

/// Failure while preparing or sending the drip on one network.
#[derive(Debug, Error)]
pub enum DripError {
    /// The faucet's own state could not be used; fatal to the claim.
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    /// The network failed; the claim stops at this network.
    #[error(transparent)]
    Chain(#[from] BroadcastError),
}

impl From<DbError> for DripError {
    fn from(err: DbError) -> Self {
        DripError::Infrastructure(err.into())
    }
}
