//! The states a claim moves through.
//!
//! Transitions:
//!
//! - Unverified -> Eligible | Rejected
//! - Eligible -> Resolving | Rejected
//! - Resolving -> Dispatching | Rejected
//! - Dispatching(i) -> Dispatching(i + 1) | Completed | PartiallyFailed
//!
//! Completed, PartiallyFailed and Rejected are terminal.

use std::fmt;

use alloy_primitives::Address;
use drip_primitives::{
    claim::{ClaimRequest, IdentityKey},
    recipient::Recipient,
    types::Network,
};

use crate::outcome::{ClaimReceipt, DispatchFailure, RejectReason};

/// State of a single claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    /// Nothing has been checked yet.
    Unverified {
        /// The claim as received.
        request: ClaimRequest,
    },

    /// The claimant may claim; the recipient has not been looked at.
    Eligible {
        /// Who is claiming.
        identity: IdentityKey,

        /// The recipient as entered.
        recipient: String,
    },

    /// The recipient is well-formed and may still need name resolution.
    Resolving {
        /// Who is claiming.
        identity: IdentityKey,

        /// The parsed recipient.
        recipient: Recipient,
    },

    /// Drips are being sent, one network at a time.
    Dispatching {
        /// Who is claiming.
        identity: IdentityKey,

        /// Snapshot of the registry taken when dispatch started.
        networks: Vec<Network>,

        /// Index into `networks` of the next network to drip on.
        next: usize,

        /// What has been sent so far.
        receipt: ClaimReceipt,
    },

    /// Every network was handled.
    Completed {
        /// Who claimed.
        identity: IdentityKey,

        /// What was sent.
        receipt: ClaimReceipt,
    },

    /// Dispatch stopped at a failing network.
    PartiallyFailed {
        /// Who claimed.
        identity: IdentityKey,

        /// What was sent before the failure.
        receipt: ClaimReceipt,

        /// The failure.
        failure: DispatchFailure,
    },

    /// The claim was refused.
    Rejected(RejectReason),
}

impl ClaimState {
    /// Starts a claim.
    pub const fn new(request: ClaimRequest) -> Self {
        ClaimState::Unverified { request }
    }

    /// Whether no further transition is possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimState::Completed { .. }
                | ClaimState::PartiallyFailed { .. }
                | ClaimState::Rejected(_)
        )
    }

    /// Enters dispatching for `recipient` over `networks`.
    pub fn dispatching(identity: IdentityKey, recipient: Address, networks: Vec<Network>) -> Self {
        ClaimState::Dispatching {
            identity,
            networks,
            next: 0,
            receipt: ClaimReceipt::new(recipient),
        }
    }
}

impl fmt::Display for ClaimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimState::Unverified { request } => write!(f, "unverified ({})", request.identity),
            ClaimState::Eligible { identity, .. } => write!(f, "eligible ({identity})"),
            ClaimState::Resolving {
                identity,
                recipient,
            } => write!(f, "resolving {recipient} ({identity})"),
            ClaimState::Dispatching {
                identity,
                networks,
                next,
                ..
            } => write!(f, "dispatching {next}/{} ({identity})", networks.len()),
            ClaimState::Completed { identity, .. } => write!(f, "completed ({identity})"),
            ClaimState::PartiallyFailed {
                identity, failure, ..
            } => write!(f, "partially failed at chain {} ({identity})", failure.chain_id),
            ClaimState::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}
