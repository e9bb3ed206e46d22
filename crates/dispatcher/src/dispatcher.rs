//! Drives a claim from request to outcome.

use std::sync::Arc;

use alloy_primitives::Address;
use drip_alert::sink::AlertSink;
use drip_chain_client::{
    client::ChainClient, ens::NameResolver, errors::ChainClientError, tx::DripTx,
};
use drip_db::{kv::KvStore, registry::NetworkRegistry};
use drip_primitives::{
    claim::{ClaimRequest, IdentityKey},
    recipient::Recipient,
    types::{ChainId, Network},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::DispatcherConfig,
    eligibility::EligibilityPolicy,
    errors::{DripError, InfrastructureError},
    nonce_cache::NonceCache,
    outcome::{ClaimOutcome, ClaimReceipt, DispatchFailure, DispatchedDrip, RejectReason},
    state::ClaimState,
    throttle::{ClaimThrottle, MarkerKind},
};

/// Text of the operator alert sent when a drip fails.
pub fn drip_failure_alert(chain_id: ChainId, cause: &ChainClientError) -> String {
    format!("Error dripping for {chain_id}, {cause}")
}

/// Handles claims end to end.
///
/// Cheap to clone; clones share every collaborator. Claims may run concurrently, but each claim
/// visits its networks strictly one after the other.
#[derive(Debug, Clone)]
pub struct ClaimDispatcher {
    registry: Arc<dyn NetworkRegistry>,
    chain: Arc<dyn ChainClient>,
    resolver: Arc<dyn NameResolver>,
    alerts: Arc<dyn AlertSink>,
    nonces: NonceCache,
    throttle: ClaimThrottle,
    eligibility: EligibilityPolicy,
}

impl ClaimDispatcher {
    /// Creates a dispatcher. Nonces and claim markers both live in `store`.
    pub fn new(
        store: Arc<dyn KvStore>,
        registry: Arc<dyn NetworkRegistry>,
        chain: Arc<dyn ChainClient>,
        resolver: Arc<dyn NameResolver>,
        alerts: Arc<dyn AlertSink>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            registry,
            chain,
            resolver,
            alerts,
            nonces: NonceCache::new(store.clone(), config.nonce_ttl),
            throttle: ClaimThrottle::new(store, config.throttle, config.allowlist),
            eligibility: config.eligibility,
        }
    }

    /// The nonce cache shared by every claim.
    pub const fn nonces(&self) -> &NonceCache {
        &self.nonces
    }

    /// The per-identity throttle.
    pub const fn throttle(&self) -> &ClaimThrottle {
        &self.throttle
    }

    /// Processes `request` to completion.
    ///
    /// Rejections and network failures are outcomes; only a failure of the faucet's own state is
    /// an error. Drips already sent when such an error occurs are not undone.
    pub async fn claim(&self, request: ClaimRequest) -> Result<ClaimOutcome, InfrastructureError> {
        let mut state = ClaimState::new(request);

        loop {
            state = match state {
                ClaimState::Unverified { request } => self.verify(request).await?,
                ClaimState::Eligible {
                    identity,
                    recipient,
                } => parse_recipient(identity, &recipient),
                ClaimState::Resolving {
                    identity,
                    recipient,
                } => self.resolve(identity, recipient).await?,
                ClaimState::Dispatching {
                    identity,
                    networks,
                    next,
                    receipt,
                } => self.dispatch_next(identity, networks, next, receipt).await?,
                ClaimState::Completed { identity, receipt } => {
                    if receipt.dispatched.is_empty() {
                        // nothing was sent, so there is nothing to throttle
                        warn!(%identity, "no networks registered, claim dripped nothing");
                    } else {
                        self.throttle.mark(&identity, MarkerKind::Completed).await?;
                    }
                    return Ok(ClaimOutcome::Completed(receipt));
                }
                ClaimState::PartiallyFailed {
                    identity,
                    receipt,
                    failure,
                } => {
                    self.throttle.mark(&identity, MarkerKind::Retry).await?;
                    return Ok(ClaimOutcome::PartiallyFailed { receipt, failure });
                }
                ClaimState::Rejected(reason) => return Ok(ClaimOutcome::Rejected(reason)),
            };

            if state.is_terminal() {
                info!(%state, "claim settled");
            } else {
                debug!(%state, "claim advanced");
            }
        }
    }

    async fn verify(&self, request: ClaimRequest) -> Result<ClaimState, InfrastructureError> {
        let ClaimRequest {
            identity,
            attributes,
            recipient,
        } = request;

        if !self.eligibility.is_eligible(&attributes) {
            info!(%identity, ?attributes, "identity is not eligible");
            return Ok(ClaimState::Rejected(RejectReason::NotEligible));
        }

        if self.throttle.is_marked(&identity).await? {
            info!(%identity, "identity already claimed");
            return Ok(ClaimState::Rejected(RejectReason::AlreadyClaimed));
        }

        Ok(ClaimState::Eligible {
            identity,
            recipient,
        })
    }

    async fn resolve(
        &self,
        identity: IdentityKey,
        recipient: Recipient,
    ) -> Result<ClaimState, InfrastructureError> {
        let address = match recipient {
            Recipient::Address(address) => address,
            Recipient::Name(name) => match self.resolver.resolve(&name).await? {
                Some(address) => {
                    info!(%name, %address, "resolved recipient");
                    address
                }
                None => {
                    info!(%name, "recipient name does not resolve");
                    return Ok(ClaimState::Rejected(RejectReason::UnresolvedName(name)));
                }
            },
        };

        let networks = self.registry.networks().await?;
        info!(%identity, recipient = %address, networks = %networks.len(), "dispatching claim");

        Ok(ClaimState::dispatching(identity, address, networks))
    }

    async fn dispatch_next(
        &self,
        identity: IdentityKey,
        networks: Vec<Network>,
        next: usize,
        mut receipt: ClaimReceipt,
    ) -> Result<ClaimState, InfrastructureError> {
        let Some(network) = networks.get(next) else {
            return Ok(ClaimState::Completed { identity, receipt });
        };

        match self.drip(network, receipt.recipient).await {
            Ok(drip) => {
                receipt.dispatched.push(drip);

                Ok(ClaimState::Dispatching {
                    identity,
                    networks,
                    next: next + 1,
                    receipt,
                })
            }
            Err(DripError::Chain(err)) => {
                error!(chain_id = %err.chain_id, cause = %err.cause, "drip failed, aborting claim");

                if let Err(alert_err) = self
                    .alerts
                    .notify(&drip_failure_alert(err.chain_id, &err.cause))
                    .await
                {
                    warn!(%alert_err, "could not deliver operator alert");
                }

                if let Err(evict_err) = self.nonces.evict(network.chain_id).await {
                    error!(chain_id = %network.chain_id, %evict_err, "could not evict cached nonce");
                }

                let failure = DispatchFailure {
                    chain_id: network.chain_id,
                    reason: err.cause.to_string(),
                    aborted: networks[next + 1..].iter().map(|n| n.chain_id).collect(),
                };

                Ok(ClaimState::PartiallyFailed {
                    identity,
                    receipt,
                    failure,
                })
            }
            Err(DripError::Infrastructure(err)) => {
                error!(chain_id = %network.chain_id, %err, "infrastructure failure during dispatch");

                if !receipt.dispatched.is_empty() {
                    // keep the claimant from immediately double-dipping on the networks that went out
                    if let Err(mark_err) = self.throttle.mark(&identity, MarkerKind::Retry).await {
                        error!(%identity, %mark_err, "could not throttle interrupted claim");
                    }
                }

                Err(err)
            }
        }
    }

    /// Sends the drip of `recipient` on `network`.
    async fn drip(&self, network: &Network, recipient: Address) -> Result<DispatchedDrip, DripError> {
        let nonce = self.nonces.get_nonce(network, self.chain.as_ref()).await?;
        let gas_price = self.chain.gas_price(network).await?;

        self.nonces.reserve_next(network.chain_id, nonce).await?;

        let tx = DripTx::new(network, recipient, gas_price, nonce);
        let tx_hash = self.chain.broadcast(network, &tx).await?;
        info!(chain_id = %network.chain_id, %nonce, %tx_hash, "dripped");

        Ok(DispatchedDrip {
            chain_id: network.chain_id,
            nonce,
            tx_hash,
        })
    }
}

fn parse_recipient(identity: IdentityKey, recipient: &str) -> ClaimState {
    match recipient.parse::<Recipient>() {
        Ok(recipient) => ClaimState::Resolving {
            identity,
            recipient,
        },
        Err(err) => {
            info!(%identity, %err, "invalid recipient");
            ClaimState::Rejected(RejectReason::InvalidRecipient(err))
        }
    }
}
