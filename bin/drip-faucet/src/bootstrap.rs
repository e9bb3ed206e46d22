//! Wires the faucet together from its configuration and runs it until shutdown.

use std::{env, fs, path::Path, sync::Arc};

use alloy::signers::local::PrivateKeySigner;
use anyhow::{anyhow, Context};
use drip_alert::{log::LogAlertSink, sink::AlertSink, slack::SlackAlertSink};
use drip_chain_client::{ens::EnsResolver, evm::EvmChainClient};
use drip_db::{kv::KvStore, persistent::sqlite::SqliteDb, registry::NetworkRegistry};
use drip_dispatcher::dispatcher::ClaimDispatcher;
use drip_primitives::types::{validate_networks, Network};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{info, warn};

use crate::{
    config::Config,
    constants::{DB_NAME, OPERATOR_KEY_ENVVAR},
    rpc_server::{start_rpc, FaucetRpc},
};

/// Bootstraps the faucet by hooking up the database, the networks, the alert channel and the rpc
/// server.
pub(crate) async fn bootstrap(config: Config) -> anyhow::Result<()> {
    info!("bootstrapping faucet");

    let signer = operator_signer()?;
    info!(operator = %signer.address(), "loaded operator key");

    let db = init_database_handle(&config).await?;
    let store: Arc<dyn KvStore> = Arc::new(db.clone());
    let registry: Arc<dyn NetworkRegistry> = Arc::new(db);

    seed_registry(registry.as_ref(), &config.networks).await?;

    let chain = Arc::new(EvmChainClient::new(signer, config.chain.rpc_timeout));
    let resolver = Arc::new(
        EnsResolver::new(&config.ens.rpc_url, config.chain.rpc_timeout)
            .context("could not set up ens resolver")?,
    );
    let alerts = alert_sink(&config)?;

    let dispatcher = ClaimDispatcher::new(
        store,
        registry.clone(),
        chain,
        resolver,
        alerts,
        config.dispatcher_config(),
    );

    let rpc = FaucetRpc::new(
        dispatcher,
        registry,
        config.admin_key.clone(),
        config.throttle.retry_ttl,
    );

    start_rpc(&rpc, &config.rpc_addr).await
}

fn operator_signer() -> anyhow::Result<PrivateKeySigner> {
    let key = env::var(OPERATOR_KEY_ENVVAR)
        .with_context(|| format!("{OPERATOR_KEY_ENVVAR} must be set"))?;

    key.trim()
        .parse::<PrivateKeySigner>()
        .map_err(|e| anyhow!("{OPERATOR_KEY_ENVVAR} is not a valid private key: {e}"))
}

fn alert_sink(config: &Config) -> anyhow::Result<Arc<dyn AlertSink>> {
    match &config.slack {
        Some(slack) => {
            info!(channel = %slack.channel, "sending alerts to slack");
            let sink = SlackAlertSink::new(slack.token.clone(), slack.channel.clone())
                .context("could not set up slack client")?;

            Ok(Arc::new(sink))
        }
        None => {
            warn!("slack is not configured, alerts will only be logged");
            Ok(Arc::new(LogAlertSink))
        }
    }
}

/// Opens the database in the data directory, creating both if needed, and brings its schema up to
/// date.
pub(crate) async fn init_database_handle(config: &Config) -> anyhow::Result<SqliteDb> {
    let db_path = create_db_dir(&config.datadir)?.join(DB_NAME);

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await
        .with_context(|| format!("could not open database at {}", db_path.display()))?;

    info!(action = "running migrations", %DB_NAME);
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("could not run migrations")?;

    Ok(SqliteDb::new(pool, config.db))
}

fn create_db_dir(datadir: &Path) -> anyhow::Result<&Path> {
    if !datadir.exists() {
        fs::create_dir_all(datadir)
            .with_context(|| format!("could not create datadir at {}", datadir.display()))?;
    }

    Ok(datadir)
}

/// Fills an empty registry with `networks`.
///
/// A registry that already holds networks is left alone so that changes made through the admin
/// RPCs survive restarts.
pub(crate) async fn seed_registry(
    registry: &dyn NetworkRegistry,
    networks: &[Network],
) -> anyhow::Result<()> {
    validate_networks(networks).context("invalid networks in config")?;

    let current = registry
        .networks()
        .await
        .context("could not read network registry")?;

    if !current.is_empty() {
        info!(count = %current.len(), "network registry already populated");
        return Ok(());
    }

    if networks.is_empty() {
        warn!("network registry is empty, claims will not drip anywhere");
        return Ok(());
    }

    registry
        .replace_networks(networks)
        .await
        .context("could not seed network registry")?;
    info!(count = %networks.len(), "seeded network registry from config");

    Ok(())
}
