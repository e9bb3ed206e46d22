//! Everything the faucet needs from the networks it drips on: reading gas prices and account
//! nonces, signing and submitting drip transactions, and resolving ENS names.
//!
//! The [`ChainClient`](client::ChainClient) and [`NameResolver`](ens::NameResolver) traits are the
//! seams the dispatcher is written against; [`EvmChainClient`](evm::EvmChainClient) and
//! [`EnsResolver`](ens::EnsResolver) implement them over Ethereum JSON-RPC.

pub mod client;
pub mod constants;
pub mod ens;
pub mod errors;
pub mod evm;
pub mod tx;
