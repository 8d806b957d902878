pub mod reserve;

pub use reserve::*;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;
use crate::models::PatientContact;

/// Reservation failure taxonomy. Each variant maps to a distinct
/// user-visible category: pick another time (Conflict), try again later
/// (RateLimited), fix the request (Validation/NotFound), or something is
/// broken (Crypto/StoreUnavailable/Database).
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid reservation request: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Slot no longer available")]
    Conflict,

    /// Always fatal — indicates data corruption or tampering, never
    /// masked or retried.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The reservation path fails closed on this: without the store the
    /// double-booking guarantee cannot be assured.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for BookingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Unavailable(detail) => BookingError::StoreUnavailable(detail),
            other => BookingError::Database(other),
        }
    }
}

/// A validated-shape booking request. Field-level semantics (known
/// tenant, open hours, free slot) are checked by the reservation flow.
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub service_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub contact: PatientContact,
}
