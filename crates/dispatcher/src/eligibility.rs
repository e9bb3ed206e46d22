//! Who may claim at all.

use drip_primitives::claim::EligibilityAttributes;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_MIN_ACCOUNT_AGE_DAYS, DEFAULT_MIN_FOLLOWERS, DEFAULT_MIN_POSTS};

/// Minimum account standing required to claim, as reported by the identity provider.
///
/// These thresholds keep throwaway accounts from draining the faucet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    /// Minimum age of the account in days.
    pub min_account_age_days: u64,

    /// Minimum number of followers.
    pub min_followers: u64,

    /// Minimum number of posts.
    pub min_posts: u64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            min_account_age_days: DEFAULT_MIN_ACCOUNT_AGE_DAYS,
            min_followers: DEFAULT_MIN_FOLLOWERS,
            min_posts: DEFAULT_MIN_POSTS,
        }
    }
}

impl EligibilityPolicy {
    /// A policy that lets every account through.
    pub const fn permissive() -> Self {
        Self {
            min_account_age_days: 0,
            min_followers: 0,
            min_posts: 0,
        }
    }

    /// Whether an account with `attributes` meets every threshold.
    pub const fn is_eligible(&self, attributes: &EligibilityAttributes) -> bool {
        attributes.account_age_days >= self.min_account_age_days
            && attributes.followers >= self.min_followers
            && attributes.posts >= self.min_posts
    }
}
