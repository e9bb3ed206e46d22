//! Interpretation of the free-form recipient a claimant types in.
//!
//! A recipient is either a literal address or an ENS name. Names are only recognized by their
//! suffix here; resolving them to an address is the job of a name resolver further up.

use std::{fmt, str::FromStr};

use alloy_primitives::Address;
use thiserror::Error;

use crate::constants::{MAX_NAME_LEN, NAME_SERVICE_SUFFIX};

/// Number of hex digits in an address.
const ADDRESS_HEX_LEN: usize = 40;

/// A parsed recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// A literal, shape- and checksum-validated address.
    Address(Address),

    /// A lowercased ENS name that still needs resolving.
    Name(String),
}

impl Recipient {
    /// Returns the address if the recipient is a literal one.
    pub const fn address(&self) -> Option<Address> {
        match self {
            Recipient::Address(address) => Some(*address),
            Recipient::Name(_) => None,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::Address(address) => f.write_str(&address.to_checksum(None)),
            Recipient::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for Recipient {
    type Err = RecipientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RecipientError::Empty);
        }

        let lowered = s.to_lowercase();
        if lowered.ends_with(NAME_SERVICE_SUFFIX) {
            return parse_name(lowered).map(Recipient::Name);
        }

        parse_address(s).map(Recipient::Address)
    }
}

fn parse_name(name: String) -> Result<String, RecipientError> {
    let valid = name.len() <= MAX_NAME_LEN
        && name.split('.').all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label
                    .chars()
                    .all(|c| c == '-' || c == '_' || c.is_alphanumeric())
        });

    // the suffix alone is not a name
    if !valid || name.len() == NAME_SERVICE_SUFFIX.len() {
        return Err(RecipientError::InvalidName(name));
    }

    Ok(name)
}

fn parse_address(s: &str) -> Result<Address, RecipientError> {
    let hex = s
        .strip_prefix("0x")
        .ok_or_else(|| RecipientError::Malformed(s.to_string()))?;

    if hex.len() != ADDRESS_HEX_LEN || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RecipientError::Malformed(s.to_string()));
    }

    let address =
        Address::from_str(hex).map_err(|_| RecipientError::Malformed(s.to_string()))?;

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    // single-case input carries no checksum
    if has_lower && has_upper && address.to_checksum(None) != s {
        return Err(RecipientError::BadChecksum(s.to_string()));
    }

    Ok(address)
}

/// Reasons a recipient string is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipientError {
    /// Nothing was entered.
    #[error("recipient is empty")]
    Empty,

    /// The input is neither an ENS name nor a `0x`-prefixed 20-byte hex address.
    #[error("malformed address: {0}")]
    Malformed(String),

    /// The input is mixed-case but the EIP-55 checksum does not match.
    #[error("address checksum mismatch: {0}")]
    BadChecksum(String),

    /// The input ends in the ENS suffix but is not a valid name.
    #[error("invalid ens name: {0}")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_literal_addresses() {
        let expected = address!("ab5801a7d398351b8be11c439e05c5b3259aec9b");

        for input in [
            "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B",
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b",
            "0xAB5801A7D398351B8BE11C439E05C5B3259AEC9B",
            "  0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B\n",
        ] {
            assert_eq!(
                input.parse::<Recipient>(),
                Ok(Recipient::Address(expected)),
                "must accept {input:?}"
            );
        }

        assert_eq!(
            Recipient::Address(expected).to_string(),
            "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B",
            "addresses must be displayed checksummed"
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!("".parse::<Recipient>(), Err(RecipientError::Empty));
        assert_eq!("   ".parse::<Recipient>(), Err(RecipientError::Empty));

        for input in [
            "ab5801a7d398351b8be11c439e05c5b3259aec9b",
            "0xab5801a7d398351b8be11c439e05c5b3259aec9",
            "0xab5801a7d398351b8be11c439e05c5b3259aec9b00",
            "0xzz5801a7d398351b8be11c439e05c5b3259aec9b",
            "0Xab5801a7d398351b8be11c439e05c5b3259aec9b",
            "vitalik",
        ] {
            assert!(
                matches!(input.parse::<Recipient>(), Err(RecipientError::Malformed(_))),
                "must reject {input:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_checksum() {
        // last character's case flipped
        let input = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9b";
        assert_eq!(
            input.parse::<Recipient>(),
            Err(RecipientError::BadChecksum(input.to_string()))
        );
    }

    #[test]
    fn recognizes_names() {
        assert_eq!(
            "Vitalik.ETH".parse::<Recipient>(),
            Ok(Recipient::Name("vitalik.eth".to_string()))
        );
        assert_eq!(
            "pay.vitalik.eth".parse::<Recipient>(),
            Ok(Recipient::Name("pay.vitalik.eth".to_string()))
        );

        for input in [".eth", "..eth", "-bad.eth", "has space.eth", "a/b.eth"] {
            assert!(
                matches!(input.parse::<Recipient>(), Err(RecipientError::InvalidName(_))),
                "must reject {input:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn checksummed_and_lowercase_forms_agree(bytes in any::<[u8; 20]>()) {
            let address = Address::from(bytes);
            let checksummed = address.to_checksum(None);
            let lowercase = checksummed.to_lowercase();

            prop_assert_eq!(checksummed.parse::<Recipient>(), Ok(Recipient::Address(address)));
            prop_assert_eq!(lowercase.parse::<Recipient>(), Ok(Recipient::Address(address)));
        }

        #[test]
        fn never_panics(input in ".*") {
            let _ = input.parse::<Recipient>();
        }
    }
}
