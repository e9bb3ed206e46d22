//! Construction of drip transactions.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
    sol,
    sol_types::SolCall,
};
use drip_primitives::{
    constants::GAS_PRICE_MULTIPLIER,
    types::{ChainId, Network},
};

sol! {
    /// The faucet contract deployed on every network.
    interface IFaucet {
        /// Sends the configured token bundle to `_recipient`.
        function drip(address _recipient) external;
    }
}

/// An unsigned call to the faucet contract's `drip` on one network.
///
/// Drips are legacy (type 0) transactions so that every network accepts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DripTx {
    /// Chain id the transaction is signed for.
    pub chain_id: ChainId,

    /// The faucet contract.
    pub to: Address,

    /// ABI-encoded `drip(recipient)` call.
    pub input: Bytes,

    /// Gas price in wei, already bumped.
    pub gas_price: u128,

    /// Gas ceiling for the call.
    pub gas_limit: u64,

    /// Operator account nonce.
    pub nonce: u64,
}

impl DripTx {
    /// Builds the drip of `recipient` on `network`.
    ///
    /// `suggested_gas_price` is what the network reported; it is multiplied by
    /// [`GAS_PRICE_MULTIPLIER`] so the drip is not stuck behind ordinary traffic.
    pub fn new(network: &Network, recipient: Address, suggested_gas_price: u128, nonce: u64) -> Self {
        Self {
            chain_id: network.chain_id,
            to: network.faucet_address,
            input: drip_calldata(recipient),
            gas_price: bumped_gas_price(suggested_gas_price),
            gas_limit: network.gas_limit(),
            nonce,
        }
    }

    /// Converts into a request ready to be signed by `from`.
    pub fn to_request(&self, from: Address) -> TransactionRequest {
        let mut request = TransactionRequest::default()
            .with_to(self.to)
            .with_input(self.input.clone())
            .with_chain_id(self.chain_id)
            .with_nonce(self.nonce)
            .with_gas_price(self.gas_price)
            .with_gas_limit(self.gas_limit);
        request.from = Some(from);

        request
    }
}

/// Encodes `drip(recipient)`.
pub fn drip_calldata(recipient: Address) -> Bytes {
    IFaucet::dripCall {
        _recipient: recipient,
    }
    .abi_encode()
    .into()
}

/// Applies the gas price policy to a suggested price.
pub const fn bumped_gas_price(suggested: u128) -> u128 {
    suggested.saturating_mul(GAS_PRICE_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::{
        consensus::{Transaction, TxEnvelope},
        network::EthereumWallet,
        primitives::address,
        signers::local::PrivateKeySigner,
    };
    use drip_primitives::constants::{ARBITRUM_GAS_LIMIT, DEFAULT_GAS_LIMIT};

    use super::*;

    const FAUCET: Address = address!("f5de760f2e916647fd766b4ad9e85ff943ce3a2b");
    const RECIPIENT: Address = address!("ab5801a7d398351b8be11c439e05c5b3259aec9b");

    // well-known development key, never funded anywhere that matters
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn gas_price_is_doubled_and_saturates() {
        assert_eq!(bumped_gas_price(0), 0);
        assert_eq!(bumped_gas_price(1_500_000_000), 3_000_000_000);
        assert_eq!(bumped_gas_price(u128::MAX), u128::MAX);
        assert_eq!(bumped_gas_price(u128::MAX / 2 + 1), u128::MAX);
    }

    #[test]
    fn drip_tx_follows_network_policy() {
        let goerli = Network::new(5, "https://goerli.example", FAUCET);
        let tx = DripTx::new(&goerli, RECIPIENT, 10, 7);

        assert_eq!(tx.chain_id, 5);
        assert_eq!(tx.to, FAUCET);
        assert_eq!(tx.gas_price, 20);
        assert_eq!(tx.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(tx.nonce, 7);

        let arbitrum = Network::new(421_611, "https://arb.example", FAUCET);
        assert_eq!(
            DripTx::new(&arbitrum, RECIPIENT, 10, 0).gas_limit,
            ARBITRUM_GAS_LIMIT
        );
    }

    #[test]
    fn calldata_encodes_recipient() {
        let calldata = drip_calldata(RECIPIENT);

        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(&calldata[..4], IFaucet::dripCall::SELECTOR.as_slice());
        assert_eq!(&calldata[16..], RECIPIENT.as_slice());

        let decoded = IFaucet::dripCall::abi_decode(&calldata, true)
            .expect("must be able to decode drip calldata");
        assert_eq!(decoded._recipient, RECIPIENT);
    }

    #[tokio::test]
    async fn signs_as_legacy_transaction() {
        let signer = PrivateKeySigner::from_str(DEV_KEY).expect("must parse dev key");
        let from = signer.address();
        let wallet = EthereumWallet::from(signer);

        let network = Network::new(80001, "https://mumbai.example", FAUCET);
        let tx = DripTx::new(&network, RECIPIENT, 1_000_000_000, 42);

        let envelope = tx
            .to_request(from)
            .build(&wallet)
            .await
            .expect("must be able to sign drip");

        assert!(matches!(envelope, TxEnvelope::Legacy(_)), "drips must be legacy");
        assert_eq!(envelope.chain_id(), Some(80001));
        assert_eq!(envelope.nonce(), 42);
        assert_eq!(envelope.gas_limit(), DEFAULT_GAS_LIMIT);
        assert_eq!(envelope.gas_price(), Some(2_000_000_000));
        assert_eq!(envelope.to(), Some(FAUCET));
        assert_eq!(envelope.input(), &tx.input);
    }
}
