//! Values shared across tests.

use alloy_primitives::{address, Address};
use drip_primitives::{
    claim::{ClaimRequest, EligibilityAttributes},
    types::{ChainId, Network},
};

/// Faucet contract address used by [`network`].
pub const FAUCET_ADDRESS: Address = address!("f5de760f2e916647fd766b4ad9e85ff943ce3a2b");

/// A healthy network entry for `chain_id`.
pub fn network(chain_id: ChainId) -> Network {
    Network::new(
        chain_id,
        format!("https://rpc-{chain_id}.example"),
        FAUCET_ADDRESS,
    )
}

/// Attributes of a long-standing, active account.
pub const fn eligible_attributes() -> EligibilityAttributes {
    EligibilityAttributes {
        account_age_days: 365,
        followers: 500,
        posts: 1_000,
    }
}

/// A claim by an eligible `identity` for `recipient`.
pub fn claim_request(identity: &str, recipient: &str) -> ClaimRequest {
    ClaimRequest::new(identity, eligible_attributes(), recipient)
}

/// A random address.
pub fn random_address() -> Address {
    Address::random()
}
