//! Constants that govern how drips are priced and how often claims may be made.

use std::time::Duration;

use crate::types::ChainId;

/// Gas limit used for a drip unless the network overrides it.
pub const DEFAULT_GAS_LIMIT: u64 = 500_000;

/// Chain id of Arbitrum Rinkeby.
pub const ARBITRUM_RINKEBY_CHAIN_ID: ChainId = 421_611;

/// Arbitrum Rinkeby rejects drips below this gas limit.
pub const ARBITRUM_GAS_LIMIT: u64 = 5_000_000;

/// Factor applied to the gas price suggested by a network before a drip is signed.
pub const GAS_PRICE_MULTIPLIER: u128 = 2;

/// How long a reserved nonce stays cached before the chain is asked again.
pub const NONCE_TTL: Duration = Duration::from_secs(5 * 60);

/// How long an identity is barred from claiming again after a completed claim.
pub const CLAIM_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// How long an identity is barred from claiming again after a claim that failed midway.
pub const RETRY_TTL: Duration = Duration::from_secs(15 * 60);

/// Suffix that marks a recipient as a name to be resolved through ENS.
pub const NAME_SERVICE_SUFFIX: &str = ".eth";

/// Longest name accepted for resolution.
pub const MAX_NAME_LEN: usize = 255;
