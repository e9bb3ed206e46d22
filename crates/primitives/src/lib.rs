//! This crate contains the types, constants and pure functions shared by every crate of the
//! faucet: target networks, claimants and recipients.
//!
//! It lies at the bottom of the crate-hierarchy in this workspace i.e., it does not depend on any
//! other crate in this workspace.

pub mod claim;
pub mod constants;
pub mod recipient;
pub mod types;
