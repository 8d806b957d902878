use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use super::blind_index;
use super::encryption::EncryptedField;
use super::CryptoError;

pub const KEY_LENGTH: usize = 32; // AES-256

/// HKDF info labels — distinct per derived key so the two secrets are
/// cryptographically independent even from one master.
const FIELD_KEY_INFO: &[u8] = b"reserva/field-encryption/v1";
const PEPPER_INFO: &[u8] = b"reserva/blind-index/v1";

/// Field-encryption key plus blind-index pepper — zeroed on drop.
///
/// Key material is supplied externally (deployment secret store); this
/// type never generates or rotates keys.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct FieldKeys {
    pub(super) field_key: [u8; KEY_LENGTH],
    pub(super) index_pepper: [u8; KEY_LENGTH],
}

impl FieldKeys {
    /// Build from two independently managed secrets.
    pub fn new(field_key: [u8; KEY_LENGTH], index_pepper: [u8; KEY_LENGTH]) -> Self {
        Self {
            field_key,
            index_pepper,
        }
    }

    /// Derive both secrets from a single 32-byte master via HKDF-SHA256
    /// with distinct info labels. Lets deployments manage one secret.
    pub fn from_master(master: &[u8; KEY_LENGTH]) -> Result<Self, CryptoError> {
        let hk = Hkdf::<Sha256>::new(None, master);

        let mut field_key = [0u8; KEY_LENGTH];
        hk.expand(FIELD_KEY_INFO, &mut field_key)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        let mut index_pepper = [0u8; KEY_LENGTH];
        hk.expand(PEPPER_INFO, &mut index_pepper)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(Self {
            field_key,
            index_pepper,
        })
    }

    /// Encrypt a field value using AES-256-GCM with a fresh random nonce.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedField, CryptoError> {
        EncryptedField::encrypt(&self.field_key, plaintext)
    }

    /// Decrypt a stored field. Authentication failure is always fatal to
    /// the calling operation — it means corruption or tampering.
    pub fn decrypt(&self, field: &EncryptedField) -> Result<String, CryptoError> {
        field.decrypt(&self.field_key)
    }

    /// Deterministic blind index over the normalized input.
    pub fn hash_for_search(&self, text: &str) -> String {
        blind_index::hash_for_search(&self.index_pepper, text)
    }
}
