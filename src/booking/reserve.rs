//! The reservation transaction: validate → throttle → resolve → encrypt
//! → upsert patient → atomic check-and-insert.
//!
//! Ordering matters. The rate limiter runs before any patient data is
//! processed; the schedule-fit check is the cheap client-visible guard;
//! the atomic insert inside the store is the authoritative race guard.

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use rusqlite::Connection;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::crypto::FieldKeys;
use crate::db;
use crate::db::ReserveOutcome;
use crate::limiter::{RateLimiter, RESERVE_ENDPOINT};
use crate::models::{AppointmentStatus, NewAppointment, Patient};
use crate::scheduling::SLOT_STEP_MINUTES;

use super::{BookingError, ReservationRequest};

const MAX_NAME_LENGTH: usize = 200;
const MAX_PHONE_LENGTH: usize = 40;

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern compiles")
    })
}

/// Shape validation. Fails fast with no side effects.
pub fn validate(request: &ReservationRequest) -> Result<(), BookingError> {
    let name = request.contact.name.trim();
    if name.is_empty() {
        return Err(BookingError::Validation("name must not be empty".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(BookingError::Validation("name too long".into()));
    }

    let email = request.contact.email.trim();
    if !email_regex().is_match(email) {
        return Err(BookingError::Validation("invalid email address".into()));
    }

    if let Some(phone) = &request.contact.phone {
        let phone = phone.trim();
        if phone.len() > MAX_PHONE_LENGTH
            || !phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            return Err(BookingError::Validation("invalid phone number".into()));
        }
    }

    if request.start_time.second() != 0
        || request.start_time.minute() % SLOT_STEP_MINUTES != 0
    {
        return Err(BookingError::Validation(format!(
            "start time must fall on the {SLOT_STEP_MINUTES}-minute grid"
        )));
    }

    Ok(())
}

/// Commit a reservation. Returns the new appointment id, or the typed
/// failure the caller maps to its UI category.
pub fn reserve(
    conn: &mut Connection,
    keys: &FieldKeys,
    limiter: &RateLimiter,
    request: &ReservationRequest,
    rate_limit_key: &str,
    now: NaiveDateTime,
) -> Result<Uuid, BookingError> {
    validate(request)?;

    // Throttle before any patient data is touched.
    limiter
        .check(conn, rate_limit_key, RESERVE_ENDPOINT, now.and_utc().timestamp())
        .map_err(|retry_after| BookingError::RateLimited { retry_after })?;

    let tenant = db::get_tenant(conn, &request.tenant_id)?
        .ok_or_else(|| BookingError::NotFound(format!("tenant {}", request.tenant_id)))?;

    let service = db::get_service(conn, &tenant.id, &request.service_id)?
        .ok_or_else(|| BookingError::NotFound(format!("service {}", request.service_id)))?;

    if let Some(provider_id) = &request.provider_id {
        let provider = db::get_provider(conn, &tenant.id, provider_id)?
            .ok_or_else(|| BookingError::NotFound(format!("provider {provider_id}")))?;
        if !provider.active {
            return Err(BookingError::NotFound(format!("provider {provider_id}")));
        }
    }

    check_schedule_fit(conn, request, service.duration_minutes, now)?;

    // Crypto boundary: from here on only ciphertext and blind indexes.
    let contact = &request.contact;
    let email = contact.email.trim();
    let patient = Patient {
        id: Uuid::new_v4(),
        tenant_id: tenant.id,
        name_enc: keys.encrypt(contact.name.trim())?,
        email_enc: keys.encrypt(email)?,
        email_hash: keys.hash_for_search(email),
        phone_enc: match contact.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(keys.encrypt(phone)?),
            _ => None,
        },
        phone_hash: match contact.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => Some(keys.hash_for_search(phone)),
            _ => None,
        },
    };
    let patient_id = db::upsert_patient(conn, &patient)?;

    let start_minute = request.start_time.hour() * 60 + request.start_time.minute();
    let outcome = db::reserve_appointment(
        conn,
        &NewAppointment {
            tenant_id: tenant.id,
            provider_id: request.provider_id,
            patient_id: Some(patient_id),
            service_id: Some(service.id),
            date: request.date,
            start_minute,
            duration_minutes: service.duration_minutes,
            status: AppointmentStatus::Confirmed,
        },
    )?;

    match outcome {
        ReserveOutcome::Booked(id) => {
            tracing::info!(
                appointment_id = %id,
                tenant_id = %tenant.id,
                date = %request.date,
                start_minute,
                "reservation confirmed"
            );
            Ok(id)
        }
        ReserveOutcome::Conflict => Err(BookingError::Conflict),
    }
}

/// The cheap pre-write check: the requested interval must sit inside an
/// enabled operating range on a non-past instant. NOT the race guard —
/// that is the atomic insert.
fn check_schedule_fit(
    conn: &Connection,
    request: &ReservationRequest,
    duration_minutes: u32,
    now: NaiveDateTime,
) -> Result<(), BookingError> {
    if request.date < now.date() {
        return Err(BookingError::Validation("requested date is in the past".into()));
    }

    let start_minute = request.start_time.hour() * 60 + request.start_time.minute();
    if request.date == now.date() {
        let now_minute = now.time().hour() * 60 + now.time().minute();
        if start_minute <= now_minute {
            return Err(BookingError::Validation(
                "requested time has already passed".into(),
            ));
        }
    }

    let schedule = db::get_weekly_schedule(conn, &request.tenant_id)?;
    let day = schedule.day(request.date);
    let end_minute = start_minute + duration_minutes;
    let fits = day.enabled
        && day
            .ranges
            .iter()
            .any(|range| range.contains_interval(start_minute, end_minute));
    if !fits {
        return Err(BookingError::Validation(
            "requested time is outside operating hours".into(),
        ));
    }

    Ok(())
}
