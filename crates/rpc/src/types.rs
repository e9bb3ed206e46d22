//! Types for the RPC server.

use alloy_primitives::{Address, TxHash};
use drip_primitives::{claim::EligibilityAttributes, types::ChainId};
use serde::{Deserialize, Serialize};

/// A claim as submitted by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcClaimRequest {
    /// Key of the authenticated account; absent when the caller is not signed in.
    #[serde(default)]
    pub identity: Option<String>,

    /// What the identity provider reports about the account.
    #[serde(default)]
    pub attributes: EligibilityAttributes,

    /// Address or ENS name to fund, as typed by the claimant.
    pub recipient: String,
}

/// A drip sent for a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcDrip {
    /// Network it was sent on.
    pub chain_id: ChainId,

    /// Hash of the transaction.
    pub tx_hash: TxHash,
}

/// The result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcClaimReceipt {
    /// The address that was funded.
    pub recipient: Address,

    /// Drips sent, in dispatch order.
    pub drips: Vec<RpcDrip>,
}

/// Whether an identity may claim right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcClaimStatus {
    /// The identity asked about.
    pub identity: String,

    /// Whether a recent claim bars the identity from claiming.
    pub throttled: bool,
}
