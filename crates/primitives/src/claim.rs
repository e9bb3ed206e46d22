//! Claimants and their claim requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key of a claimant as issued by the identity provider (e.g. a Twitter account id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wraps a raw identity key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IdentityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Account attributes the identity provider reports for a claimant, used to decide eligibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityAttributes {
    /// Age of the account in days.
    pub account_age_days: u64,

    /// Number of followers.
    pub followers: u64,

    /// Number of posts authored.
    pub posts: u64,
}

/// A request to fund a recipient on every configured network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Who is claiming.
    pub identity: IdentityKey,

    /// What the identity provider knows about the claimant.
    pub attributes: EligibilityAttributes,

    /// The recipient exactly as entered: a hex address or an ENS name.
    pub recipient: String,
}

impl ClaimRequest {
    /// Creates a new claim request.
    pub fn new(
        identity: impl Into<IdentityKey>,
        attributes: EligibilityAttributes,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            attributes,
            recipient: recipient.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_is_a_plain_string_on_the_wire() {
        let request = ClaimRequest::new(
            "1078014622525988864",
            EligibilityAttributes {
                account_age_days: 400,
                followers: 20,
                posts: 3,
            },
            "vitalik.eth",
        );

        let json = serde_json::to_value(&request).expect("must serialize claim request");
        assert_eq!(json["identity"], "1078014622525988864");
        assert_eq!(json["attributes"]["followers"], 20);

        let parsed: ClaimRequest =
            serde_json::from_value(json).expect("must deserialize claim request");
        assert_eq!(parsed, request);
    }
}
