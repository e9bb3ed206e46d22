//! The registry of networks the faucet drips on.

use std::fmt::Debug;

use async_trait::async_trait;
use drip_primitives::types::Network;

use crate::errors::DbResult;

/// Ordered list of target networks.
///
/// The order in which networks are returned is the order in which claims are dispatched; it is the
/// order in which networks were first added.
#[async_trait]
pub trait NetworkRegistry: Debug + Send + Sync {
    /// Returns every registered network, in registry order.
    async fn networks(&self) -> DbResult<Vec<Network>>;

    /// Replaces the whole registry with `networks`, keeping their order.
    async fn replace_networks(&self, networks: &[Network]) -> DbResult<()>;

    /// Appends `networks` to the registry.
    ///
    /// A network whose chain id is already registered is updated in place and keeps its position.
    async fn append_networks(&self, networks: &[Network]) -> DbResult<()>;
}
