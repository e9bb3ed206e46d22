//! SQLite implementation of the persistent storage layer.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use drip_primitives::types::Network;
use sqlx::SqlitePool;
use tracing::{trace, warn};

use super::{config::DbConfig, errors::StorageError, models::NetworkRow};
use crate::{
    errors::{DbError, DbResult},
    kv::KvStore,
    registry::NetworkRegistry,
};

/// SQLite-backed [`KvStore`] and [`NetworkRegistry`].
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pool: SqlitePool,
    config: DbConfig,
}

impl SqliteDb {
    /// Creates a new handle over a migrated pool.
    pub fn new(pool: SqlitePool, config: DbConfig) -> Self {
        Self { pool, config }
    }

    /// Returns the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the retry configuration.
    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or the retry budget in `config`
/// is spent. The wait between attempts grows linearly with the attempt number.
pub async fn execute_with_retries<F, Fut, T>(config: &DbConfig, mut op: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < config.max_retry_count() => {
                attempt += 1;
                let backoff = config.backoff_period() * attempt as u32;
                warn!(%err, %attempt, ?backoff, "database operation failed, retrying");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(DbError::Storage(err)),
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn expiry_millis(now: i64, ttl: Duration) -> i64 {
    now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

fn to_db_int(value: u64, what: &str) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::MismatchedTypes(format!("{what} {value}")))
}

#[async_trait]
impl KvStore for SqliteDb {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let value = sqlx::query_scalar::<_, String>(
                "SELECT value FROM kv_entries WHERE key = $1 AND expires_at > $2",
            )
            .bind(key)
            .bind(now_millis())
            .fetch_optional(pool)
            .await?;

            Ok(value)
        })
        .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let now = now_millis();
            let mut tx = pool.begin().await?;

            sqlx::query("DELETE FROM kv_entries WHERE expires_at <= $1")
                .bind(now)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT OR REPLACE INTO kv_entries (key, value, expires_at) VALUES ($1, $2, $3)",
            )
            .bind(key)
            .bind(value)
            .bind(expiry_millis(now, ttl))
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            trace!(%key, ?ttl, "stored kv entry");

            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> DbResult<bool> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let now = now_millis();
            let mut tx = pool.begin().await?;

            let live = sqlx::query("DELETE FROM kv_entries WHERE key = $1 AND expires_at > $2")
                .bind(key)
                .bind(now)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            sqlx::query("DELETE FROM kv_entries WHERE key = $1")
                .bind(key)
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            Ok(live > 0)
        })
        .await
    }
}

async fn upsert_network<'c, E>(executor: E, network: &Network) -> Result<(), StorageError>
where
    E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
{
    let gas_limit = network
        .gas_limit
        .map(|limit| to_db_int(limit, "gas limit"))
        .transpose()?;

    sqlx::query(
        "INSERT INTO networks
            (chain_id, rpc_url, faucet_address, gas_limit, disclaimer, depleted)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (chain_id) DO UPDATE SET
                rpc_url = excluded.rpc_url,
                faucet_address = excluded.faucet_address,
                gas_limit = excluded.gas_limit,
                disclaimer = excluded.disclaimer,
                depleted = excluded.depleted",
    )
    .bind(to_db_int(network.chain_id, "chain id")?)
    .bind(&network.rpc_url)
    .bind(network.faucet_address.to_checksum(None))
    .bind(gas_limit)
    .bind(&network.disclaimer)
    .bind(network.depleted)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait]
impl NetworkRegistry for SqliteDb {
    async fn networks(&self) -> DbResult<Vec<Network>> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let rows = sqlx::query_as::<_, NetworkRow>(
                "SELECT chain_id, rpc_url, faucet_address, gas_limit, disclaimer, depleted
                    FROM networks
                    ORDER BY position ASC",
            )
            .fetch_all(pool)
            .await?;

            rows.into_iter().map(Network::try_from).collect()
        })
        .await
    }

    async fn replace_networks(&self, networks: &[Network]) -> DbResult<()> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let mut tx = pool.begin().await?;

            sqlx::query("DELETE FROM networks")
                .execute(&mut *tx)
                .await?;

            for network in networks {
                upsert_network(&mut *tx, network).await?;
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }

    async fn append_networks(&self, networks: &[Network]) -> DbResult<()> {
        let pool = &self.pool;
        execute_with_retries(&self.config, move || async move {
            let mut tx = pool.begin().await?;

            for network in networks {
                upsert_network(&mut *tx, network).await?;
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;

    use super::*;

    fn network(chain_id: u64) -> Network {
        Network::new(
            chain_id,
            format!("https://rpc-{chain_id}.example"),
            Address::repeat_byte(0x42),
        )
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_kv_store(pool: SqlitePool) {
        let db = SqliteDb::new(pool, DbConfig::default());

        assert!(
            db.get("nonce-5").await.is_ok_and(|v| v.is_none()),
            "entry must not exist initially"
        );

        db.set_ex("nonce-5", "7", Duration::from_secs(300))
            .await
            .expect("must be able to set entry");
        assert!(
            db.get("nonce-5").await.is_ok_and(|v| v.as_deref() == Some("7")),
            "entry must exist after setting"
        );

        db.set_ex("nonce-5", "8", Duration::from_secs(300))
            .await
            .expect("must be able to replace entry");
        assert!(
            db.get("nonce-5").await.is_ok_and(|v| v.as_deref() == Some("8")),
            "entry must be replaced"
        );

        assert!(db.delete("nonce-5").await.is_ok_and(|removed| removed));
        assert!(
            db.get("nonce-5").await.is_ok_and(|v| v.is_none()),
            "entry must not exist after deletion"
        );
        assert!(db.delete("nonce-5").await.is_ok_and(|removed| !removed));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_kv_store_expiry(pool: SqlitePool) {
        let db = SqliteDb::new(pool, DbConfig::default());

        db.set_ex("claim-expired", "1", Duration::ZERO)
            .await
            .expect("must be able to set entry");
        assert!(
            db.get("claim-expired").await.is_ok_and(|v| v.is_none()),
            "entry with an elapsed ttl must not be visible"
        );
        assert!(
            db.delete("claim-expired").await.is_ok_and(|removed| !removed),
            "an expired entry does not count as removed"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_network_registry(pool: SqlitePool) {
        let db = SqliteDb::new(pool, DbConfig::default());

        assert!(db.networks().await.is_ok_and(|n| n.is_empty()));

        let mut arbitrum = network(421_611);
        arbitrum.gas_limit = Some(5_000_000);
        arbitrum.disclaimer = Some("Faucet drips 100 DAI instead of 500 DAI.".to_string());

        db.replace_networks(&[network(5), network(42), arbitrum.clone()])
            .await
            .expect("must be able to replace networks");
        assert_eq!(
            db.networks().await.unwrap(),
            vec![network(5), network(42), arbitrum.clone()],
            "networks must come back in insertion order"
        );

        let mut depleted_kovan = network(42);
        depleted_kovan.depleted = true;
        db.append_networks(&[network(43113), depleted_kovan.clone()])
            .await
            .expect("must be able to append networks");
        assert_eq!(
            db.networks().await.unwrap(),
            vec![network(5), depleted_kovan, arbitrum, network(43113)],
            "existing networks must be updated in place"
        );

        db.replace_networks(&[network(80001)])
            .await
            .expect("must be able to replace networks");
        assert_eq!(db.networks().await.unwrap(), vec![network(80001)]);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn constraint_violations_are_not_retried(pool: SqlitePool) {
        let config = DbConfig::default()
            .with_max_retry_count(3)
            .with_backoff_period(Duration::from_millis(1));

        let mut attempts = 0;
        let result = execute_with_retries(&config, || {
            attempts += 1;
            let pool = pool.clone();
            async move {
                // chain ids are unique
                for _ in 0..2 {
                    sqlx::query(
                        "INSERT INTO networks (chain_id, rpc_url, faucet_address) VALUES (5, '', '')",
                    )
                    .execute(&pool)
                    .await?;
                }

                Ok::<_, StorageError>(())
            }
        })
        .await;

        assert!(
            matches!(result, Err(DbError::Storage(StorageError::Driver(sqlx::Error::Database(_))))),
            "duplicate chain id must be a database error, got {result:?}"
        );
        assert_eq!(attempts, 1, "a constraint violation must fail on the first attempt");
    }
}
