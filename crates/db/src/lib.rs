//! Storage for the faucet's shared state: a key-value store with per-key expiry backing the nonce
//! cache and the claim throttle, and the registry of target networks.
//!
//! Every store comes as a trait with an in-memory implementation (used by tests and local runs)
//! and a SQLite implementation (used in production).

pub mod errors;
pub mod inmemory;
pub mod kv;
pub mod persistent;
pub mod registry;
