//! Provides the JSON-RPC interface of the faucet.
//!
//! The interface is split into claiming, registry administration and control of the server
//! itself. Failures are reported as JSON-RPC errors whose code mirrors an HTTP status, see
//! [`errors`].

pub mod errors;
pub mod traits;
pub mod types;
