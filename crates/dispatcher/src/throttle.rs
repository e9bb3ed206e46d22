//! One claim per identity per window.

use std::{collections::HashSet, sync::Arc, time::Duration};

use drip_db::kv::KvStore;
use drip_primitives::claim::IdentityKey;
use tracing::{debug, info};

use crate::{config::ThrottleConfig, errors::InfrastructureError};

/// Key under which the claim marker of `identity` is stored.
pub fn claim_key(identity: &IdentityKey) -> String {
    format!("claim-{identity}")
}

/// Why a claim marker was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The claim reached every network.
    Completed,

    /// The claim stopped at a failing network.
    Retry,
}

impl MarkerKind {
    /// Value stored under the marker key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Completed => "completed",
            MarkerKind::Retry => "retry",
        }
    }
}

/// Gate that bars an identity from claiming again for a while.
#[derive(Debug, Clone)]
pub struct ClaimThrottle {
    store: Arc<dyn KvStore>,
    config: ThrottleConfig,
    allowlist: HashSet<IdentityKey>,
}

impl ClaimThrottle {
    /// Creates a throttle over `store`. Identities on `allowlist` are never marked.
    pub fn new(
        store: Arc<dyn KvStore>,
        config: ThrottleConfig,
        allowlist: impl IntoIterator<Item = IdentityKey>,
    ) -> Self {
        Self {
            store,
            config,
            allowlist: allowlist.into_iter().collect(),
        }
    }

    /// Whether `identity` bypasses the throttle.
    pub fn is_unthrottled(&self, identity: &IdentityKey) -> bool {
        self.allowlist.contains(identity)
    }

    /// Whether `identity` has a live claim marker.
    pub async fn is_marked(&self, identity: &IdentityKey) -> Result<bool, InfrastructureError> {
        Ok(self.store.get(&claim_key(identity)).await?.is_some())
    }

    /// Marks `identity` after a claim ended as `kind`.
    ///
    /// Returns `false` without writing anything for allow-listed identities.
    pub async fn mark(
        &self,
        identity: &IdentityKey,
        kind: MarkerKind,
    ) -> Result<bool, InfrastructureError> {
        if self.is_unthrottled(identity) {
            info!(%identity, "identity is allow-listed, not throttling");
            return Ok(false);
        }

        let ttl = self.ttl(kind);
        self.store
            .set_ex(&claim_key(identity), kind.as_str(), ttl)
            .await?;
        debug!(%identity, ?kind, ?ttl, "throttled identity");

        Ok(true)
    }

    /// Lifetime of a marker of `kind`.
    pub const fn ttl(&self, kind: MarkerKind) -> Duration {
        match kind {
            MarkerKind::Completed => self.config.claim_ttl,
            MarkerKind::Retry => self.config.retry_ttl,
        }
    }
}
