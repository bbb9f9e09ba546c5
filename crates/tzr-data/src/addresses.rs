//! Known-address registry and selection resolution.
//!
//! User selections arrive as tokens: either an alias from the registry below
//! or a literal address string. Aliases carry a role tag; the fee-owner role
//! marks the wallet whose incoming transfers are a marketplace commission
//! cut, from which an estimated total volume is derived downstream.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Marketplace commission rate in basis points (3%). Kept in basis points so
/// the estimated-volume division stays in integer math.
pub const FEE_RATE_BPS: u64 = 300;

/// Exact length of a Tezos address string.
const ADDRESS_LEN: usize = 36;

/// Recognized address prefix classes: tz1/tz2/tz3 implicit accounts,
/// KT1 originated contracts.
const ADDRESS_PREFIXES: [&str; 4] = ["tz1", "tz2", "tz3", "KT1"];

/// Base58check payload length: 3 prefix bytes + 20-byte key/contract hash.
const ADDRESS_PAYLOAD_LEN: usize = 23;

/// Role a reported address plays in aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressRole {
    /// Plain wallet: counted as-is.
    Generic,
    /// Marketplace fee wallet: incoming amounts are a commission cut, so an
    /// estimated total volume is derived via [`FEE_RATE_BPS`].
    FeeOwner,
}

/// A resolved chain address with its role and display alias.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Raw chain address string.
    pub value: String,
    /// Role derived once at resolution, never mutated afterwards.
    pub role: AddressRole,
    /// Registry alias, when the address was selected by alias.
    pub alias: Option<String>,
}

/// One entry of the static registry.
#[derive(Clone, Copy, Debug)]
pub struct KnownAddress {
    /// Short selection token.
    pub alias: &'static str,
    /// Chain address.
    pub address: &'static str,
    /// Human label for display.
    pub label: &'static str,
    /// Role tag.
    pub role: AddressRole,
}

/// Static registry of selectable aliases.
pub const KNOWN_ADDRESSES: [KnownAddress; 2] = [
    KnownAddress {
        alias: "bank",
        address: "tz1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD",
        label: "Primary payout wallet",
        role: AddressRole::Generic,
    },
    KnownAddress {
        alias: "mp_owner",
        address: "KT1HbQepzV1nVGg8QVznG7z4RcHseD5kwqBn",
        label: "Marketplace fee wallet",
        role: AddressRole::FeeOwner,
    },
];

/// Checks a literal token against the address-format grammar: fixed length,
/// recognized prefix, and a valid base58check payload.
pub fn is_valid_address(token: &str) -> bool {
    if token.len() != ADDRESS_LEN {
        return false;
    }
    if !ADDRESS_PREFIXES.iter().any(|p| token.starts_with(p)) {
        return false;
    }
    match bs58::decode(token).with_check(None).into_vec() {
        Ok(payload) => payload.len() == ADDRESS_PAYLOAD_LEN,
        Err(_) => false,
    }
}

/// Resolves user-selected tokens into a deduplicated ordered address set.
///
/// A token matching a registry alias resolves to that entry; anything else
/// must pass the address-format check and resolves as a generic custom
/// address. Duplicate addresses keep their first occurrence.
///
/// # Errors
/// [`DataError::InvalidAddress`] when a custom token fails the format check,
/// [`DataError::NoAddressSelected`] when the resolved set is empty.
pub fn resolve_selection(tokens: &[String]) -> Result<Vec<Address>, DataError> {
    let mut resolved: Vec<Address> = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let address = match KNOWN_ADDRESSES.iter().find(|k| k.alias == token) {
            Some(known) => Address {
                value: known.address.to_string(),
                role: known.role,
                alias: Some(known.alias.to_string()),
            },
            None => {
                if !is_valid_address(token) {
                    return Err(DataError::InvalidAddress(token.to_string()));
                }
                Address {
                    value: token.to_string(),
                    role: AddressRole::Generic,
                    alias: None,
                }
            }
        };

        if !resolved.iter().any(|a| a.value == address.value) {
            resolved.push(address);
        }
    }

    if resolved.is_empty() {
        return Err(DataError::NoAddressSelected);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_implicit_account() {
        assert!(is_valid_address("tz1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD"));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_valid_address("tz1cY5tTfFb5c4Q9VyJ895y6eLk1"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn rejects_unknown_prefix() {
        assert!(!is_valid_address("xx1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD"));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        // Last character flipped: length and prefix survive, checksum does not.
        assert!(!is_valid_address("tz1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVE"));
    }

    #[test]
    fn rejects_non_base58_characters() {
        // '0' and 'O' are outside the base58 alphabet.
        assert!(!is_valid_address("tz10Y5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD"));
    }

    #[test]
    fn resolves_alias_with_role() {
        let resolved = resolve_selection(&["mp_owner".to_string()]).expect("alias should resolve");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].role, AddressRole::FeeOwner);
        assert_eq!(resolved[0].alias.as_deref(), Some("mp_owner"));
    }

    #[test]
    fn resolves_custom_address_as_generic() {
        let resolved = resolve_selection(&["tz1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD".to_string()])
            .expect("custom address should resolve");
        assert_eq!(resolved[0].role, AddressRole::Generic);
        assert!(resolved[0].alias.is_none());
    }

    #[test]
    fn deduplicates_preserving_first_occurrence() {
        let resolved = resolve_selection(&[
            "bank".to_string(),
            "mp_owner".to_string(),
            "tz1cY5tTfFb5c4Q9VyJ895y6eLk1ohXXqwVD".to_string(),
        ])
        .expect("selection should resolve");

        // The custom token is the same address as the `bank` alias.
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].alias.as_deref(), Some("bank"));
        assert_eq!(resolved[1].alias.as_deref(), Some("mp_owner"));
    }

    #[test]
    fn invalid_custom_token_fails() {
        let err = resolve_selection(&["not-an-address".to_string()]).unwrap_err();
        assert!(matches!(err, DataError::InvalidAddress(token) if token == "not-an-address"));
    }

    #[test]
    fn empty_selection_fails() {
        assert!(matches!(
            resolve_selection(&[]),
            Err(DataError::NoAddressSelected)
        ));
        assert!(matches!(
            resolve_selection(&["  ".to_string()]),
            Err(DataError::NoAddressSelected)
        ));
    }
}
