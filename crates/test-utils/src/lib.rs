//! This crate provides test doubles for the faucet's external collaborators (networks, the name
//! service and the alert channel) along with fixtures for the values most tests need.
//!
//! The doubles record every call they receive so tests can assert not only on outcomes but on
//! exactly what was asked of the outside world.

pub mod alert;
pub mod chain;
pub mod fixtures;
pub mod resolver;
