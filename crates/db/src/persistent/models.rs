//! Row types read back from SQLite.

use std::str::FromStr;

use alloy_primitives::Address;
use drip_primitives::types::Network;
use sqlx::FromRow;

use super::errors::StorageError;

/// A row of the `networks` table.
#[derive(Debug, Clone, FromRow)]
pub(super) struct NetworkRow {
    pub(super) chain_id: i64,
    pub(super) rpc_url: String,
    pub(super) faucet_address: String,
    pub(super) gas_limit: Option<i64>,
    pub(super) disclaimer: Option<String>,
    pub(super) depleted: bool,
}

impl TryFrom<NetworkRow> for Network {
    type Error = StorageError;

    fn try_from(row: NetworkRow) -> Result<Self, Self::Error> {
        let chain_id = u64::try_from(row.chain_id)
            .map_err(|_| StorageError::MismatchedTypes(format!("chain id {}", row.chain_id)))?;
        let faucet_address = Address::from_str(&row.faucet_address).map_err(|e| {
            StorageError::MismatchedTypes(format!("faucet address {}: {e}", row.faucet_address))
        })?;
        let gas_limit = row
            .gas_limit
            .map(|limit| {
                u64::try_from(limit)
                    .map_err(|_| StorageError::MismatchedTypes(format!("gas limit {limit}")))
            })
            .transpose()?;

        Ok(Network {
            chain_id,
            rpc_url: row.rpc_url,
            faucet_address,
            gas_limit,
            disclaimer: row.disclaimer,
            depleted: row.depleted,
        })
    }
}
