use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::keys::KEY_LENGTH;
use super::CryptoError;

const NONCE_LENGTH: usize = 12;
const DELIMITER: char = ':';

/// An encrypted field value: `nonceBase64:ciphertextBase64` (ciphertext
/// includes the AES-GCM auth tag). Opaque outside the crypto boundary —
/// this is exactly what lands in the database and in API payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedField(String);

impl EncryptedField {
    /// Encrypt plaintext using AES-256-GCM with a random nonce. The same
    /// plaintext encrypted twice yields two different outputs.
    pub(crate) fn encrypt(
        key_bytes: &[u8; KEY_LENGTH],
        plaintext: &str,
    ) -> Result<Self, CryptoError> {
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(Self(format!(
            "{}{}{}",
            BASE64.encode(nonce_bytes),
            DELIMITER,
            BASE64.encode(&ciphertext)
        )))
    }

    /// Decrypt using AES-256-GCM. Fails on tampered ciphertext or a
    /// wrong key (auth-tag mismatch); malformed container strings fail
    /// before any cryptography runs.
    pub(crate) fn decrypt(&self, key_bytes: &[u8; KEY_LENGTH]) -> Result<String, CryptoError> {
        let (nonce_b64, ciphertext_b64) = self
            .0
            .split_once(DELIMITER)
            .ok_or(CryptoError::MalformedField)?;

        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|_| CryptoError::MalformedField)?;
        if nonce_bytes.len() != NONCE_LENGTH {
            return Err(CryptoError::MalformedField);
        }

        let ciphertext = BASE64
            .decode(ciphertext_b64)
            .map_err(|_| CryptoError::MalformedField)?;

        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Wrap a stored value loaded from the database.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> [u8; KEY_LENGTH] {
        [42u8; KEY_LENGTH]
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key();
        let encrypted = EncryptedField::encrypt(&key, "Maria González").unwrap();
        let decrypted = encrypted.decrypt(&key).unwrap();
        assert_eq!(decrypted, "Maria González");
    }

    #[test]
    fn ciphertext_is_nondeterministic() {
        let key = test_key();
        let e1 = EncryptedField::encrypt(&key, "same input").unwrap();
        let e2 = EncryptedField::encrypt(&key, "same input").unwrap();
        assert_ne!(e1, e2);
    }

    #[test]
    fn output_has_nonce_ciphertext_shape() {
        let key = test_key();
        let encrypted = EncryptedField::encrypt(&key, "shape").unwrap();
        let parts: Vec<&str> = encrypted.as_str().splitn(2, ':').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(BASE64.decode(parts[0]).unwrap().len(), NONCE_LENGTH);
        assert!(!parts[1].is_empty());
    }

    #[test]
    fn decrypt_with_wrong_key_fails() {
        let encrypted = EncryptedField::encrypt(&[1u8; KEY_LENGTH], "secret").unwrap();
        let result = encrypted.decrypt(&[2u8; KEY_LENGTH]);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_detected() {
        let key = test_key();
        let encrypted = EncryptedField::encrypt(&key, "secret data").unwrap();
        let (nonce_b64, ct_b64) = encrypted.as_str().split_once(':').unwrap();
        let mut ct = BASE64.decode(ct_b64).unwrap();
        ct[0] ^= 0xFF;
        let tampered =
            EncryptedField::from_stored(format!("{nonce_b64}:{}", BASE64.encode(&ct)));
        assert!(matches!(
            tampered.decrypt(&key),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn missing_delimiter_rejected() {
        let field = EncryptedField::from_stored("no-delimiter-here".into());
        assert!(matches!(
            field.decrypt(&test_key()),
            Err(CryptoError::MalformedField)
        ));
    }

    #[test]
    fn garbage_base64_rejected() {
        let field = EncryptedField::from_stored("!!!:???".into());
        assert!(matches!(
            field.decrypt(&test_key()),
            Err(CryptoError::MalformedField)
        ));
    }

    #[test]
    fn wrong_nonce_length_rejected() {
        let short_nonce = BASE64.encode([0u8; 4]);
        let ct = BASE64.encode([0u8; 32]);
        let field = EncryptedField::from_stored(format!("{short_nonce}:{ct}"));
        assert!(matches!(
            field.decrypt(&test_key()),
            Err(CryptoError::MalformedField)
        ));
    }

    #[test]
    fn empty_plaintext_round_trip() {
        let key = test_key();
        let encrypted = EncryptedField::encrypt(&key, "").unwrap();
        let decrypted = encrypted.decrypt(&key).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn serde_is_transparent() {
        let key = test_key();
        let encrypted = EncryptedField::encrypt(&key, "json me").unwrap();
        let json = serde_json::to_string(&encrypted).unwrap();
        assert_eq!(json, format!("\"{}\"", encrypted.as_str()));
        let back: EncryptedField = serde_json::from_str(&json).unwrap();
        assert_eq!(back, encrypted);
    }
}
