//! Bootstraps the RPC server of the faucet.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use drip_db::registry::NetworkRegistry;
use drip_dispatcher::{
    dispatcher::ClaimDispatcher,
    outcome::{ClaimOutcome, ClaimReceipt, RejectReason},
};
use drip_primitives::{
    claim::{ClaimRequest, IdentityKey},
    types::{validate_networks, Network},
};
use drip_rpc::{
    errors::{rpc_error, rpc_error_with_data, BAD_REQUEST, FORBIDDEN, INTERNAL, UNAUTHENTICATED},
    traits::{DripClaimApiServer, DripControlApiServer, DripRegistryApiServer},
    types::{RpcClaimReceipt, RpcClaimRequest, RpcClaimStatus, RpcDrip},
};
use jsonrpsee::{core::RpcResult, types::ErrorObjectOwned, RpcModule};
use tracing::{debug, error, info, warn};

use crate::config::AdminKey;

/// Starts the RPC server and serves until the process is asked to shut down.
pub(crate) async fn start_rpc<T>(rpc_impl: &T, rpc_addr: &str) -> anyhow::Result<()>
where
    T: DripControlApiServer + DripClaimApiServer + DripRegistryApiServer + Clone + Sync + Send,
{
    let mut rpc_module = RpcModule::new(rpc_impl.clone());

    let control_api = DripControlApiServer::into_rpc(rpc_impl.clone());
    let claim_api = DripClaimApiServer::into_rpc(rpc_impl.clone());
    let registry_api = DripRegistryApiServer::into_rpc(rpc_impl.clone());

    rpc_module.merge(control_api).context("merge control api")?;
    rpc_module.merge(claim_api).context("merge claim api")?;
    rpc_module
        .merge(registry_api)
        .context("merge registry api")?;

    info!("starting faucet rpc server at {rpc_addr}");
    let rpc_server = jsonrpsee::server::ServerBuilder::new()
        .build(&rpc_addr)
        .await
        .with_context(|| format!("could not bind rpc server to {rpc_addr}"))?;

    let rpc_handle = rpc_server.start(rpc_module);
    debug!("faucet rpc server started");

    tokio::signal::ctrl_c()
        .await
        .context("could not listen for shutdown signal")?;
    info!("stopping rpc server");

    if rpc_handle.stop().is_err() {
        warn!("rpc server already stopped");
    }
    rpc_handle.stopped().await;

    Ok(())
}

/// RPC server for the faucet.
#[derive(Debug, Clone)]
pub(crate) struct FaucetRpc {
    /// Server start time.
    start_time: DateTime<Utc>,

    /// Handles claims.
    dispatcher: ClaimDispatcher,

    /// The networks claims are dispatched to.
    registry: Arc<dyn NetworkRegistry>,

    /// Guards registry writes.
    admin_key: AdminKey,

    /// How long a claimant waits after a failed claim, quoted in the error message.
    retry_ttl: Duration,
}

impl FaucetRpc {
    /// Create a new instance of [`FaucetRpc`].
    pub(crate) fn new(
        dispatcher: ClaimDispatcher,
        registry: Arc<dyn NetworkRegistry>,
        admin_key: AdminKey,
        retry_ttl: Duration,
    ) -> Self {
        Self {
            start_time: Utc::now(),
            dispatcher,
            registry,
            admin_key,
            retry_ttl,
        }
    }

    fn retry_message(&self) -> String {
        format!(
            "Error claiming, try again in {} minutes.",
            self.retry_ttl.as_secs().div_ceil(60)
        )
    }

    /// Checks a registry write: entries first, then the key.
    fn authorize_write(&self, admin_key: &str, networks: &[Network]) -> RpcResult<()> {
        validate_networks(networks).map_err(|e| rpc_error(BAD_REQUEST, e.to_string()))?;

        if !self.admin_key.matches(admin_key) {
            warn!("rejected registry write with wrong admin key");
            return Err(rpc_error(FORBIDDEN, "Unauthorized"));
        }

        Ok(())
    }

    async fn current_networks(&self) -> RpcResult<Vec<Network>> {
        self.registry.networks().await.map_err(|e| {
            error!(%e, "could not read network registry");
            internal_error()
        })
    }
}

fn internal_error() -> ErrorObjectOwned {
    rpc_error(INTERNAL, "Internal error, try again later.")
}

fn to_rpc_receipt(receipt: &ClaimReceipt) -> RpcClaimReceipt {
    RpcClaimReceipt {
        recipient: receipt.recipient,
        drips: receipt
            .dispatched
            .iter()
            .map(|drip| RpcDrip {
                chain_id: drip.chain_id,
                tx_hash: drip.tx_hash,
            })
            .collect(),
    }
}

fn rejection_error(reason: &RejectReason) -> ErrorObjectOwned {
    match reason {
        RejectReason::NotEligible => rpc_error(
            FORBIDDEN,
            "Account does not meet the requirements to claim.",
        ),
        RejectReason::AlreadyClaimed => rpc_error(BAD_REQUEST, "Already claimed in 24h window"),
        RejectReason::InvalidRecipient(_) => rpc_error(BAD_REQUEST, "Invalid address."),
        RejectReason::UnresolvedName(_) => {
            rpc_error(BAD_REQUEST, "Invalid ENS name. No reverse record.")
        }
    }
}

#[async_trait]
impl DripControlApiServer for FaucetRpc {
    async fn get_uptime(&self) -> RpcResult<u64> {
        let current_time = Utc::now().timestamp();
        let start_time = self.start_time.timestamp();

        // The user might care about their system time being incorrect.
        if current_time <= start_time {
            return Err(rpc_error_with_data(
                INTERNAL,
                "system time may be inaccurate", // `start_time` may have been incorrect too
                current_time.saturating_sub(start_time),
            ));
        }

        Ok(current_time.abs_diff(start_time))
    }
}

#[async_trait]
impl DripClaimApiServer for FaucetRpc {
    async fn claim(&self, request: RpcClaimRequest) -> RpcResult<RpcClaimReceipt> {
        let Some(identity) = request.identity.filter(|identity| !identity.is_empty()) else {
            return Err(rpc_error(UNAUTHENTICATED, "Not authenticated."));
        };

        let request = ClaimRequest::new(identity, request.attributes, request.recipient);
        match self.dispatcher.claim(request).await {
            Ok(ClaimOutcome::Completed(receipt)) => Ok(to_rpc_receipt(&receipt)),
            Ok(ClaimOutcome::PartiallyFailed { receipt, failure }) => {
                warn!(%failure, "claim partially failed");
                Err(rpc_error_with_data(
                    INTERNAL,
                    self.retry_message(),
                    to_rpc_receipt(&receipt),
                ))
            }
            Ok(ClaimOutcome::Rejected(reason)) => Err(rejection_error(&reason)),
            Err(e) => {
                error!(%e, "claim failed");
                Err(internal_error())
            }
        }
    }

    async fn get_claim_status(&self, identity: String) -> RpcResult<RpcClaimStatus> {
        let throttled = self
            .dispatcher
            .throttle()
            .is_marked(&IdentityKey::new(identity.as_str()))
            .await
            .map_err(|e| {
                error!(%e, "could not read claim marker");
                internal_error()
            })?;

        Ok(RpcClaimStatus {
            identity,
            throttled,
        })
    }
}

#[async_trait]
impl DripRegistryApiServer for FaucetRpc {
    async fn get_networks(&self) -> RpcResult<Vec<Network>> {
        self.current_networks().await
    }

    async fn replace_networks(
        &self,
        admin_key: String,
        networks: Vec<Network>,
    ) -> RpcResult<Vec<Network>> {
        self.authorize_write(&admin_key, &networks)?;

        self.registry
            .replace_networks(&networks)
            .await
            .map_err(|e| {
                error!(%e, "could not replace network registry");
                internal_error()
            })?;
        info!(count = %networks.len(), "replaced network registry");

        self.current_networks().await
    }

    async fn append_networks(
        &self,
        admin_key: String,
        networks: Vec<Network>,
    ) -> RpcResult<Vec<Network>> {
        self.authorize_write(&admin_key, &networks)?;

        self.registry
            .append_networks(&networks)
            .await
            .map_err(|e| {
                error!(%e, "could not append to network registry");
                internal_error()
            })?;
        info!(count = %networks.len(), "appended to network registry");

        self.current_networks().await
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use drip_db::inmemory::{kv::InMemoryKvStore, registry::InMemoryNetworkRegistry};
    use drip_dispatcher::config::DispatcherConfig;
    use drip_primitives::{claim::EligibilityAttributes, constants::RETRY_TTL};
    use drip_test_utils::{
        alert::RecordingAlertSink,
        chain::MockChainClient,
        fixtures::{eligible_attributes, network},
        resolver::StaticNameResolver,
    };

    use super::*;

    const RECIPIENT: &str = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B";

    struct Harness {
        store: InMemoryKvStore,
        chain: MockChainClient,
        registry: InMemoryNetworkRegistry,
        rpc: FaucetRpc,
    }

    fn harness() -> Harness {
        let store = InMemoryKvStore::new();
        let chain = MockChainClient::new();
        let registry = InMemoryNetworkRegistry::new(vec![network(5), network(42)]);

        let dispatcher = ClaimDispatcher::new(
            Arc::new(store.clone()),
            Arc::new(registry.clone()),
            Arc::new(chain.clone()),
            Arc::new(StaticNameResolver::new()),
            Arc::new(RecordingAlertSink::new()),
            DispatcherConfig::default(),
        );
        let rpc = FaucetRpc::new(
            dispatcher,
            Arc::new(registry.clone()),
            AdminKey::from("hunter2"),
            RETRY_TTL,
        );

        Harness {
            store,
            chain,
            registry,
            rpc,
        }
    }

    fn request(identity: Option<&str>, recipient: &str) -> RpcClaimRequest {
        RpcClaimRequest {
            identity: identity.map(str::to_string),
            attributes: eligible_attributes(),
            recipient: recipient.to_string(),
        }
    }

    fn assert_error(result: RpcResult<impl std::fmt::Debug>, code: i32, message: &str) {
        let err = result.expect_err("must fail");
        assert_eq!(err.code(), code, "unexpected code for {err:?}");
        assert_eq!(err.message(), message);
    }

    #[tokio::test]
    async fn claim_returns_receipt() {
        let h = harness();
        h.chain.set_account_nonce(5, 7);

        let receipt = h
            .rpc
            .claim(request(Some("alice"), RECIPIENT))
            .await
            .expect("claim must succeed");

        assert_eq!(receipt.recipient, RECIPIENT.parse::<Address>().unwrap());
        assert_eq!(
            receipt.drips,
            vec![
                RpcDrip {
                    chain_id: 5,
                    tx_hash: MockChainClient::tx_hash_for(5, 7),
                },
                RpcDrip {
                    chain_id: 42,
                    tx_hash: MockChainClient::tx_hash_for(42, 0),
                },
            ]
        );

        let status = h.rpc.get_claim_status("alice".to_string()).await.unwrap();
        assert!(status.throttled);

        assert_error(
            h.rpc.claim(request(Some("alice"), RECIPIENT)).await,
            BAD_REQUEST,
            "Already claimed in 24h window",
        );
    }

    #[tokio::test]
    async fn claim_rejections_map_to_status_codes() {
        let h = harness();

        for identity in [None, Some("")] {
            assert_error(
                h.rpc.claim(request(identity, RECIPIENT)).await,
                UNAUTHENTICATED,
                "Not authenticated.",
            );
        }

        assert_error(
            h.rpc.claim(request(Some("alice"), "0x1234")).await,
            BAD_REQUEST,
            "Invalid address.",
        );
        assert_error(
            h.rpc.claim(request(Some("alice"), "vitalik.eth")).await,
            BAD_REQUEST,
            "Invalid ENS name. No reverse record.",
        );

        let mut newcomer = request(Some("bob"), RECIPIENT);
        newcomer.attributes = EligibilityAttributes::default();
        assert_error(
            h.rpc.claim(newcomer).await,
            FORBIDDEN,
            "Account does not meet the requirements to claim.",
        );

        assert!(h.chain.calls().is_empty());
        assert!(!h
            .rpc
            .get_claim_status("alice".to_string())
            .await
            .unwrap()
            .throttled);
    }

    #[tokio::test]
    async fn partial_failure_reports_sent_drips() {
        let h = harness();
        h.chain.fail_broadcasts_on(42);

        let err = h
            .rpc
            .claim(request(Some("alice"), RECIPIENT))
            .await
            .expect_err("claim must fail");

        assert_eq!(err.code(), INTERNAL);
        assert_eq!(err.message(), "Error claiming, try again in 15 minutes.");

        let data = err.data().expect("must carry the partial receipt");
        let receipt: RpcClaimReceipt =
            serde_json::from_str(data.get()).expect("must carry a receipt");
        assert_eq!(receipt.drips.len(), 1);
        assert_eq!(receipt.drips[0].chain_id, 5);
    }

    #[tokio::test]
    async fn store_outage_is_internal_error() {
        let h = harness();
        h.store.set_unavailable(true);

        assert_error(
            h.rpc.claim(request(Some("alice"), RECIPIENT)).await,
            INTERNAL,
            "Internal error, try again later.",
        );
        assert_error(
            h.rpc.get_claim_status("alice".to_string()).await,
            INTERNAL,
            "Internal error, try again later.",
        );
    }

    #[tokio::test]
    async fn registry_writes_need_valid_entries_and_key() {
        let h = harness();

        let mut broken = network(69);
        broken.rpc_url = String::new();
        assert_error(
            h.rpc
                .replace_networks("wrong".to_string(), vec![broken])
                .await,
            BAD_REQUEST,
            "network 69 has no rpc url",
        );

        assert_error(
            h.rpc
                .replace_networks("wrong".to_string(), vec![network(69)])
                .await,
            FORBIDDEN,
            "Unauthorized",
        );
        assert_eq!(h.registry.networks().await.unwrap().len(), 2);

        let replaced = h
            .rpc
            .replace_networks("hunter2".to_string(), vec![network(69), network(80001)])
            .await
            .expect("must replace registry");
        assert_eq!(replaced, vec![network(69), network(80001)]);

        let mut depleted = network(69);
        depleted.depleted = true;
        let appended = h
            .rpc
            .append_networks("hunter2".to_string(), vec![network(5), depleted.clone()])
            .await
            .expect("must append to registry");
        assert_eq!(appended, vec![depleted, network(80001), network(5)]);
        assert_eq!(h.rpc.get_networks().await.unwrap(), appended);
    }

    #[tokio::test]
    async fn uptime_counts_from_start() {
        let h = harness();
        let rpc = FaucetRpc {
            start_time: Utc::now() - chrono::Duration::seconds(90),
            ..h.rpc
        };

        assert!(rpc.get_uptime().await.is_ok_and(|uptime| uptime >= 90));
    }
}
