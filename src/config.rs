use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::crypto::{CryptoError, FieldKeys, KEY_LENGTH};
use crate::limiter::RateLimitPolicy;
use crate::scheduling::SEARCH_WEEKS;

/// Application-level constants
pub const APP_NAME: &str = "Reserva";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the base64-encoded 32-byte master
/// secret. Field key and blind-index pepper are derived from it; the
/// engine never generates or rotates key material.
pub const MASTER_KEY_ENV: &str = "RESERVA_MASTER_KEY";

/// Environment variable for the database path (server binary).
pub const DATABASE_PATH_ENV: &str = "RESERVA_DB";

/// Environment variable for the listen address (server binary).
pub const LISTEN_ADDR_ENV: &str = "RESERVA_ADDR";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Default log filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub rate_limit: RateLimitPolicy,
    pub search_weeks: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitPolicy::reserve_default(),
            search_weeks: SEARCH_WEEKS,
        }
    }
}

/// Load and derive key material from `RESERVA_MASTER_KEY`.
pub fn keys_from_env() -> Result<FieldKeys, CryptoError> {
    let encoded = std::env::var(MASTER_KEY_ENV)
        .map_err(|_| CryptoError::InvalidKey(format!("{MASTER_KEY_ENV} is not set")))?;
    keys_from_base64(&encoded)
}

/// Derive keys from a base64-encoded 32-byte master secret.
pub fn keys_from_base64(encoded: &str) -> Result<FieldKeys, CryptoError> {
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| CryptoError::InvalidKey("master key is not valid base64".into()))?;
    let master: [u8; KEY_LENGTH] = bytes.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!("master key must be {KEY_LENGTH} bytes"))
    })?;
    FieldKeys::from_master(&master)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.search_weeks, 8);
    }

    #[test]
    fn keys_from_valid_base64() {
        let encoded = BASE64.encode([1u8; KEY_LENGTH]);
        assert!(keys_from_base64(&encoded).is_ok());
    }

    #[test]
    fn keys_reject_bad_base64() {
        assert!(matches!(
            keys_from_base64("not base64!!!"),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn keys_reject_wrong_length() {
        let encoded = BASE64.encode([1u8; 16]);
        assert!(matches!(
            keys_from_base64(&encoded),
            Err(CryptoError::InvalidKey(_))
        ));
    }
}
