//! The claim dispatcher: turns a verified claim into one drip per configured network.
//!
//! A claim walks an explicit state machine ([`ClaimState`](state::ClaimState)). Eligibility and
//! the per-identity throttle are checked first, then the recipient is resolved, then every network
//! in the registry is dripped in order. The next nonce per network is kept in a shared
//! [`NonceCache`](nonce_cache::NonceCache) so that concurrent claims do not all ask the chain, and
//! is evicted whenever a drip fails so the next claim starts again from the chain's view.

pub mod config;
pub mod dispatcher;
pub mod eligibility;
pub mod errors;
pub mod nonce_cache;
pub mod outcome;
pub mod state;
pub mod throttle;
