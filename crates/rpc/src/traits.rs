//! Traits for the RPC server.

use drip_primitives::types::Network;
use jsonrpsee::{core::RpcResult, proc_macros::rpc};

use crate::types::{RpcClaimReceipt, RpcClaimRequest, RpcClaimStatus};

/// RPCs related to information about the server itself.
#[cfg_attr(not(feature = "client"), rpc(server, namespace = "drip"))]
#[cfg_attr(feature = "client", rpc(server, client, namespace = "drip"))]
pub trait DripControlApi {
    /// Get the uptime of the server in seconds assuming the clock is strictly monotonically
    /// increasing.
    #[method(name = "uptime")]
    async fn get_uptime(&self) -> RpcResult<u64>;
}

/// RPCs used by claimants.
#[cfg_attr(not(feature = "client"), rpc(server, namespace = "drip"))]
#[cfg_attr(feature = "client", rpc(server, client, namespace = "drip"))]
pub trait DripClaimApi {
    /// Drip to the requested recipient on every configured network.
    ///
    /// Returns the recipient address and the hash of every transaction that was sent.
    #[method(name = "claim")]
    async fn claim(&self, request: RpcClaimRequest) -> RpcResult<RpcClaimReceipt>;

    /// Query whether an identity is currently barred from claiming.
    #[method(name = "claimStatus")]
    async fn get_claim_status(&self, identity: String) -> RpcResult<RpcClaimStatus>;
}

/// RPCs that read and administer the list of networks the faucet drips on.
///
/// Writes require the admin key configured on the server.
#[cfg_attr(not(feature = "client"), rpc(server, namespace = "drip"))]
#[cfg_attr(feature = "client", rpc(server, client, namespace = "drip"))]
pub trait DripRegistryApi {
    /// Get every registered network in dispatch order.
    #[method(name = "networks")]
    async fn get_networks(&self) -> RpcResult<Vec<Network>>;

    /// Replace the whole registry with `networks`.
    ///
    /// Returns the registry after the update.
    #[method(name = "replaceNetworks")]
    async fn replace_networks(
        &self,
        admin_key: String,
        networks: Vec<Network>,
    ) -> RpcResult<Vec<Network>>;

    /// Add `networks` to the end of the registry, updating entries whose chain id is already
    /// registered in place.
    ///
    /// Returns the registry after the update.
    #[method(name = "appendNetworks")]
    async fn append_networks(
        &self,
        admin_key: String,
        networks: Vec<Network>,
    ) -> RpcResult<Vec<Network>>;
}
