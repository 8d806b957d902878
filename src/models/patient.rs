use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::EncryptedField;

/// A stored patient record. Identifying fields only exist in encrypted
/// form plus their blind indexes; nothing here is plaintext PII.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name_enc: EncryptedField,
    pub email_enc: EncryptedField,
    pub email_hash: String,
    pub phone_enc: Option<EncryptedField>,
    pub phone_hash: Option<String>,
}

/// Plaintext contact fields as received from a booking request. Lives
/// only on the stack during the reservation flow; the crypto boundary
/// turns it into a `Patient` before anything is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}
