//! Tunables of the claim dispatcher.

use std::time::Duration;

use drip_primitives::{
    claim::IdentityKey,
    constants::{CLAIM_TTL, NONCE_TTL, RETRY_TTL},
};
use serde::{Deserialize, Serialize};

use crate::eligibility::EligibilityPolicy;

/// Default minimum account age, in days.
pub const DEFAULT_MIN_ACCOUNT_AGE_DAYS: u64 = 30;

/// Default minimum follower count.
pub const DEFAULT_MIN_FOLLOWERS: u64 = 15;

/// Default minimum post count.
pub const DEFAULT_MIN_POSTS: u64 = 1;

/// How long claim markers and cached nonces live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// How long an identity waits after a completed claim.
    pub claim_ttl: Duration,

    /// How long an identity waits after a claim that failed on some network.
    pub retry_ttl: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            claim_ttl: CLAIM_TTL,
            retry_ttl: RETRY_TTL,
        }
    }
}

/// Everything the dispatcher needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Who may claim.
    pub eligibility: EligibilityPolicy,

    /// Identities that are never throttled.
    pub allowlist: Vec<IdentityKey>,

    /// Claim marker lifetimes.
    pub throttle: ThrottleConfig,

    /// Lifetime of a reserved nonce.
    pub nonce_ttl: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            eligibility: EligibilityPolicy::default(),
            allowlist: Vec::new(),
            throttle: ThrottleConfig::default(),
            nonce_ttl: NONCE_TTL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_config_toml() {
        let config: ThrottleConfig = toml::from_str(
            r#"
            claim_ttl = { secs = 43200, nanos = 0 }
            retry_ttl = { secs = 300, nanos = 0 }
            "#,
        )
        .expect("must be able to deserialize throttle config");

        assert_eq!(config.claim_ttl, Duration::from_secs(12 * 60 * 60));
        assert_eq!(config.retry_ttl, Duration::from_secs(5 * 60));

        let serialized = toml::to_string(&ThrottleConfig::default())
            .expect("must be able to serialize throttle config");
        assert!(
            toml::from_str::<ThrottleConfig>(&serialized).is_ok_and(|c| c == ThrottleConfig::default()),
            "must round-trip through toml"
        );
    }
}
