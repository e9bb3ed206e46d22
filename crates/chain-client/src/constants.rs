//! Defaults for talking to networks.

use std::time::Duration;

use alloy::primitives::{address, Address};

/// Upper bound on a single JSON-RPC call unless configured otherwise.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// The ENS registry, deployed at the same address on mainnet and the public testnets.
pub const ENS_REGISTRY_ADDRESS: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");
