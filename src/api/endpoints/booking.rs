use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{rate_limit_key, ApiContext};
use crate::booking::ReservationRequest;
use crate::models::PatientContact;

#[derive(Deserialize)]
pub struct ReserveBody {
    pub date: NaiveDate,
    /// Requested slot start, `HH:MM` (practice-local).
    pub time: String,
    pub service_id: Uuid,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    pub patient: PatientContact,
}

#[derive(Serialize)]
pub struct ReserveResponse {
    pub appointment_id: Uuid,
}

/// `POST /api/tenants/:tenant_id/appointments` — commit a reservation.
///
/// 201 with the appointment id on success; 409 SLOT_TAKEN tells the
/// caller to re-query availability and let the patient pick again.
pub async fn create(
    State(ctx): State<ApiContext>,
    Path(tenant_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<ReserveBody>,
) -> Result<(StatusCode, Json<ReserveResponse>), ApiError> {
    let start_time = NaiveTime::parse_from_str(&body.time, "%H:%M")
        .map_err(|_| ApiError::BadRequest(format!("invalid time \"{}\"", body.time)))?;

    let request = ReservationRequest {
        tenant_id,
        date: body.date,
        start_time,
        service_id: body.service_id,
        provider_id: body.provider_id,
        contact: body.patient,
    };

    let source = rate_limit_key(&headers);
    let appointment_id = ctx.engine.reserve(&request, &source)?;

    Ok((
        StatusCode::CREATED,
        Json(ReserveResponse { appointment_id }),
    ))
}
