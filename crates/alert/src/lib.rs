//! Operator notifications.
//!
//! The faucet tells its operators when a drip fails so they can top up the operator account or
//! investigate the network. Notifications are best-effort: a sink that fails only logs.

pub mod errors;
pub mod log;
pub mod sink;
pub mod slack;
