//! What a claim comes to.

use std::fmt;

use alloy_primitives::{Address, TxHash};
use drip_primitives::{recipient::RecipientError, types::ChainId};

/// A drip that a network accepted into its pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedDrip {
    /// Network it was sent on.
    pub chain_id: ChainId,

    /// Nonce it was signed with.
    pub nonce: u64,

    /// Hash of the signed transaction.
    pub tx_hash: TxHash,
}

/// Everything that happened for a claim that got as far as dispatching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// The recipient, after name resolution.
    pub recipient: Address,

    /// Drips sent, in registry order.
    pub dispatched: Vec<DispatchedDrip>,
}

impl ClaimReceipt {
    /// Creates an empty receipt for `recipient`.
    pub const fn new(recipient: Address) -> Self {
        Self {
            recipient,
            dispatched: Vec::new(),
        }
    }
}

/// The network a claim stopped at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    /// Network whose drip failed.
    pub chain_id: ChainId,

    /// Error reported for it.
    pub reason: String,

    /// Networks after it that were not attempted.
    pub aborted: Vec<ChainId>,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drip failed on chain {}: {}", self.chain_id, self.reason)
    }
}

/// Why a claim was turned away before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The account does not meet the eligibility thresholds.
    NotEligible,

    /// The identity claimed within the current window.
    AlreadyClaimed,

    /// The recipient is neither a valid address nor a valid name.
    InvalidRecipient(RecipientError),

    /// The name has no address record.
    UnresolvedName(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotEligible => f.write_str("account is not eligible"),
            RejectReason::AlreadyClaimed => f.write_str("already claimed"),
            RejectReason::InvalidRecipient(err) => write!(f, "invalid recipient: {err}"),
            RejectReason::UnresolvedName(name) => write!(f, "{name} does not resolve"),
        }
    }
}

/// Terminal result of a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Every registered network accepted a drip.
    Completed(ClaimReceipt),

    /// Dispatch stopped at a failing network; drips sent before it stand.
    PartiallyFailed {
        /// What was sent before the failure.
        receipt: ClaimReceipt,

        /// Where and why dispatch stopped.
        failure: DispatchFailure,
    },

    /// The claim was refused with no side effects.
    Rejected(RejectReason),
}

impl ClaimOutcome {
    /// Drips that went out, whatever the outcome.
    pub fn dispatched(&self) -> &[DispatchedDrip] {
        match self {
            ClaimOutcome::Completed(receipt) | ClaimOutcome::PartiallyFailed { receipt, .. } => {
                &receipt.dispatched
            }
            ClaimOutcome::Rejected(_) => &[],
        }
    }
}

impl fmt::Display for ClaimOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimOutcome::Completed(receipt) => write!(
                f,
                "completed for {} on {} networks",
                receipt.recipient,
                receipt.dispatched.len()
            ),
            ClaimOutcome::PartiallyFailed { receipt, failure } => write!(
                f,
                "partially failed for {} after {} networks ({failure})",
                receipt.recipient,
                receipt.dispatched.len()
            ),
            ClaimOutcome::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}
