//! API error types with structured JSON responses.
//!
//! Every engine failure maps to a distinct machine-readable code so the
//! booking UI can tell "pick another time" (SLOT_TAKEN) from "try again
//! later" (RATE_LIMITED) from "something is broken" (CRYPTO_FAILURE,
//! STORE_UNAVAILABLE).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::booking::BookingError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
    #[error("Slot no longer available")]
    SlotTaken,
    #[error("Field protection failure")]
    CryptoFailure,
    #[error("Store unavailable")]
    StoreUnavailable,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "VALIDATION", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::RateLimited { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                format!("Rate limit exceeded. Retry after {retry_after}s"),
            ),
            ApiError::SlotTaken => (
                StatusCode::CONFLICT,
                "SLOT_TAKEN",
                "Slot no longer available — please pick another time".to_string(),
            ),
            ApiError::CryptoFailure => {
                // Data corruption or tampering. Details stay server-side.
                tracing::error!("field decryption/authentication failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CRYPTO_FAILURE",
                    "A data protection error occurred".to_string(),
                )
            }
            ApiError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Booking is temporarily unavailable, please try again".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        // Add retry-after header for rate limited responses
        if let ApiError::RateLimited { retry_after } = &self {
            if let Ok(val) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(detail) => ApiError::BadRequest(detail),
            BookingError::NotFound(detail) => ApiError::NotFound(detail),
            BookingError::RateLimited { retry_after } => ApiError::RateLimited { retry_after },
            BookingError::Conflict => ApiError::SlotTaken,
            BookingError::Crypto(_) => ApiError::CryptoFailure,
            BookingError::StoreUnavailable(_) => ApiError::StoreUnavailable,
            BookingError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}
