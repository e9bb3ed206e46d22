use std::{fmt, path::PathBuf, time::Duration};

use drip_db::persistent::config::DbConfig;
use drip_dispatcher::{
    config::{DispatcherConfig, ThrottleConfig},
    eligibility::EligibilityPolicy,
};
use drip_primitives::{claim::IdentityKey, constants::NONCE_TTL, types::Network};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// The configuration values that dictate the behavior of the faucet.
///
/// The operator signing key is deliberately absent; it is read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Config {
    /// The directory to store all the data in.
    pub datadir: PathBuf,

    /// The address the RPC server listens on.
    pub rpc_addr: String,

    /// Key that must accompany every write to the network registry.
    pub admin_key: AdminKey,

    /// Identities that may claim as often as they like.
    #[serde(default)]
    pub allowlist: Vec<IdentityKey>,

    /// The number of runtime worker threads.
    pub num_threads: Option<u8>,

    /// The stack size of each runtime worker thread, in bytes.
    pub thread_stack_size: Option<usize>,

    /// How long a reserved nonce stays cached.
    #[serde(default = "default_nonce_ttl")]
    pub nonce_ttl: Duration,

    /// The configuration for the sqlite3 database.
    pub db: DbConfig,

    /// How the faucet talks to target networks.
    pub chain: ChainConfig,

    /// Where ENS names are resolved.
    pub ens: EnsConfig,

    /// Where operator alerts go; alerts are only logged when absent.
    pub slack: Option<SlackConfig>,

    /// Who may claim.
    #[serde(default)]
    pub eligibility: EligibilityPolicy,

    /// How long identities wait between claims.
    #[serde(default)]
    pub throttle: ThrottleConfig,

    /// Networks to seed the registry with when it is empty.
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl Config {
    /// Extracts what the claim dispatcher needs.
    pub(crate) fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            eligibility: self.eligibility,
            allowlist: self.allowlist.clone(),
            throttle: self.throttle,
            nonce_ttl: self.nonce_ttl,
        }
    }
}

const fn default_nonce_ttl() -> Duration {
    NONCE_TTL
}

/// Shared secret guarding writes to the network registry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct AdminKey(String);

impl AdminKey {
    /// Whether `candidate` is this key. An empty key matches nothing.
    ///
    /// Runs in time independent of where the two keys differ.
    pub(crate) fn matches(&self, candidate: &str) -> bool {
        let (key, candidate) = (self.0.as_bytes(), candidate.as_bytes());

        !key.is_empty() && key.len() == candidate.len() && key.ct_eq(candidate).into()
    }
}

impl fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminKey(..)")
    }
}

impl From<&str> for AdminKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ChainConfig {
    /// Bound on every JSON-RPC call to a network.
    pub rpc_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EnsConfig {
    /// JSON-RPC endpoint of a mainnet node.
    pub rpc_url: String,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SlackConfig {
    /// Bot token with the `chat:write` scope.
    pub token: String,

    /// Channel alerts are posted to.
    pub channel: String,
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
