//! `Engine` — the shared handle behind every exposed operation.
//!
//! Owns the database path, the derived key material and the throttle
//! policy. Connections are opened per operation (request handlers are
//! stateless tasks); migrations run once at construction.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::booking::{self, BookingError, ReservationRequest};
use crate::config::EngineConfig;
use crate::crypto::{CryptoError, EncryptedField, FieldKeys};
use crate::db::{self, DatabaseError};
use crate::limiter::RateLimiter;
use crate::scheduling::{self, SearchOutcome};

pub struct Engine {
    db_path: PathBuf,
    keys: FieldKeys,
    limiter: RateLimiter,
    config: EngineConfig,
}

impl Engine {
    pub fn new(
        db_path: impl Into<PathBuf>,
        keys: FieldKeys,
        config: EngineConfig,
    ) -> Result<Self, DatabaseError> {
        let db_path = db_path.into();
        // Opening runs migrations; surfaces schema problems immediately.
        db::open_database(&db_path)?;
        Ok(Self {
            db_path,
            keys,
            limiter: RateLimiter::new(config.rate_limit),
            config,
        })
    }

    pub fn open_db(&self) -> Result<Connection, DatabaseError> {
        db::open_database(&self.db_path)
    }

    /// Bookable slot-start times for one day. Read-only; used by the
    /// booking UI to render choices.
    pub fn available_slots(
        &self,
        tenant_id: &Uuid,
        day: NaiveDate,
        service_id: &Uuid,
        provider_id: Option<&Uuid>,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let conn = self.open_db()?;
        let now = chrono::Local::now().naive_local();
        self.slots_on_day(&conn, tenant_id, day, service_id, provider_id, now)
    }

    /// Earliest date with at least one bookable slot, or `Exhausted`
    /// after the configured week bound. Never falls back to a
    /// fully-booked day.
    pub fn first_available_date(
        &self,
        tenant_id: &Uuid,
        service_id: &Uuid,
        provider_id: Option<&Uuid>,
    ) -> Result<SearchOutcome, BookingError> {
        let conn = self.open_db()?;
        let now = chrono::Local::now().naive_local();

        let tenant = db::get_tenant(&conn, tenant_id)?
            .ok_or_else(|| BookingError::NotFound(format!("tenant {tenant_id}")))?;
        let service = db::get_service(&conn, &tenant.id, service_id)?
            .ok_or_else(|| BookingError::NotFound(format!("service {service_id}")))?;
        let schedule = db::get_weekly_schedule(&conn, &tenant.id)?;

        scheduling::first_available_date(now.date(), self.config.search_weeks, |day| {
            let occupied = db::occupied_intervals(&conn, &tenant.id, provider_id, day)?;
            let slots = scheduling::available_slots(
                day,
                schedule.day(day),
                service.duration_minutes,
                &occupied,
                now,
            );
            Ok::<_, BookingError>(!slots.is_empty())
        })
    }

    /// Commit a reservation. See `booking::reserve` for the step
    /// ordering and failure semantics.
    pub fn reserve(
        &self,
        request: &ReservationRequest,
        rate_limit_key: &str,
    ) -> Result<Uuid, BookingError> {
        let mut conn = self.open_db()?;
        let now = chrono::Local::now().naive_local();
        booking::reserve(&mut conn, &self.keys, &self.limiter, request, rate_limit_key, now)
    }

    // ── Crypto passthrough — the field-protection contract ─────────

    pub fn encrypt_field(&self, plaintext: &str) -> Result<EncryptedField, CryptoError> {
        self.keys.encrypt(plaintext)
    }

    pub fn decrypt_field(&self, field: &EncryptedField) -> Result<String, CryptoError> {
        self.keys.decrypt(field)
    }

    pub fn hash_for_search(&self, text: &str) -> String {
        self.keys.hash_for_search(text)
    }

    fn slots_on_day(
        &self,
        conn: &Connection,
        tenant_id: &Uuid,
        day: NaiveDate,
        service_id: &Uuid,
        provider_id: Option<&Uuid>,
        now: NaiveDateTime,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let tenant = db::get_tenant(conn, tenant_id)?
            .ok_or_else(|| BookingError::NotFound(format!("tenant {tenant_id}")))?;
        let service = db::get_service(conn, &tenant.id, service_id)?
            .ok_or_else(|| BookingError::NotFound(format!("service {service_id}")))?;

        let schedule = db::get_weekly_schedule(conn, &tenant.id)?;
        let occupied = db::occupied_intervals(conn, &tenant.id, provider_id, day)?;

        Ok(scheduling::available_slots(
            day,
            schedule.day(day),
            service.duration_minutes,
            &occupied,
            now,
        ))
    }
}
