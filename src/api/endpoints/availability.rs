//! Read-path endpoints: slot listing and first-available-date. Both are
//! side-effect-free and safe to call while a booking is in flight — the
//! atomic insert, not these views, is the source of truth.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::scheduling::SearchOutcome;

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
    pub service_id: Uuid,
    pub provider_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    /// Slot-start times as `HH:MM`, ascending.
    pub slots: Vec<String>,
}

/// `GET /api/tenants/:tenant_id/slots?date&service_id&provider_id`
pub async fn slots(
    State(ctx): State<ApiContext>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, ApiError> {
    let slots = ctx.engine.available_slots(
        &tenant_id,
        query.date,
        &query.service_id,
        query.provider_id.as_ref(),
    )?;

    Ok(Json(SlotsResponse {
        date: query.date,
        slots: slots.iter().map(|t| t.format("%H:%M").to_string()).collect(),
    }))
}

#[derive(Deserialize)]
pub struct FirstAvailableQuery {
    pub service_id: Uuid,
    pub provider_id: Option<Uuid>,
}

/// `exhausted: true` is a real answer — the UI renders "no availability"
/// and never substitutes a fully-booked day.
#[derive(Serialize)]
pub struct FirstAvailableResponse {
    pub date: Option<NaiveDate>,
    pub exhausted: bool,
}

/// `GET /api/tenants/:tenant_id/first-available?service_id&provider_id`
pub async fn first_available(
    State(ctx): State<ApiContext>,
    Path(tenant_id): Path<Uuid>,
    Query(query): Query<FirstAvailableQuery>,
) -> Result<Json<FirstAvailableResponse>, ApiError> {
    let outcome = ctx.engine.first_available_date(
        &tenant_id,
        &query.service_id,
        query.provider_id.as_ref(),
    )?;

    let response = match outcome {
        SearchOutcome::Found(date) => FirstAvailableResponse {
            date: Some(date),
            exhausted: false,
        },
        SearchOutcome::Exhausted => FirstAvailableResponse {
            date: None,
            exhausted: true,
        },
    };

    Ok(Json(response))
}
