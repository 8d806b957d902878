//! Deterministic blind index for encrypted fields.
//!
//! Contact fields are stored only as AES-GCM ciphertext, so equality
//! lookup (patient deduplication by email) needs a separate keyed hash:
//! HMAC-SHA256 over the normalized value under a secret pepper. Equal
//! normalized inputs always produce the same hex digest; without the
//! pepper the digest reveals nothing about the value.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::keys::KEY_LENGTH;

type HmacSha256 = Hmac<Sha256>;

/// Normalize then hash. Empty input passes through unchanged: an absent
/// value has no index.
pub fn hash_for_search(pepper: &[u8; KEY_LENGTH], text: &str) -> String {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return normalized;
    }

    let mut mac =
        HmacSha256::new_from_slice(pepper).expect("HMAC can take key of any size");
    mac.update(normalized.as_bytes());
    let digest = mac.finalize().into_bytes();

    use std::fmt::Write as _;
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEPPER: [u8; KEY_LENGTH] = [9u8; KEY_LENGTH];

    #[test]
    fn equal_inputs_hash_identically() {
        let h1 = hash_for_search(&PEPPER, "foo@bar.com");
        let h2 = hash_for_search(&PEPPER, "foo@bar.com");
        assert_eq!(h1, h2);
    }

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(
            hash_for_search(&PEPPER, " Foo@Bar.com "),
            hash_for_search(&PEPPER, "foo@bar.com")
        );
    }

    #[test]
    fn different_inputs_hash_differently() {
        assert_ne!(
            hash_for_search(&PEPPER, "foo@bar.com"),
            hash_for_search(&PEPPER, "foo@baz.com")
        );
    }

    #[test]
    fn different_peppers_hash_differently() {
        let other = [10u8; KEY_LENGTH];
        assert_ne!(
            hash_for_search(&PEPPER, "foo@bar.com"),
            hash_for_search(&other, "foo@bar.com")
        );
    }

    #[test]
    fn empty_input_passes_through() {
        assert_eq!(hash_for_search(&PEPPER, ""), "");
        assert_eq!(hash_for_search(&PEPPER, "   "), "");
    }

    #[test]
    fn output_is_lowercase_hex() {
        let hash = hash_for_search(&PEPPER, "+34 600 000 001");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
