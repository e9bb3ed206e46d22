//! In-memory implementations of the stores, used by tests and for running without a database.

pub mod errors;
pub mod kv;
pub mod registry;
