pub mod blind_index;
pub mod encryption;
pub mod keys;

pub use blind_index::*;
pub use encryption::*;
pub use keys::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Malformed encrypted field")]
    MalformedField,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}
