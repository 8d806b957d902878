use chrono::NaiveDate;
use rusqlite::{params, Connection, TransactionBehavior};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus, NewAppointment, OccupiedInterval};

/// Statuses that occupy time, as a SQL list. Must stay in sync with
/// `AppointmentStatus::occupies_slot` and the partial unique index.
const OCCUPYING: &str = "('confirmed', 'pending', 'blocked')";

/// Result of the atomic check-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    Booked(Uuid),
    Conflict,
}

/// Atomically verify the slot is free and insert the appointment.
///
/// Opens an IMMEDIATE transaction — SQLite takes the write lock up
/// front, so the overlap count and the insert are one indivisible unit
/// with respect to every other writer. There is no window in which a
/// second reservation for the same slot can pass the check. The partial
/// unique index on the exact slot is a second guard; a violation from it
/// reports the same `Conflict` outcome.
///
/// A busy/locked store surfaces as `DatabaseError::Unavailable`: the
/// outcome is unknown and the caller must re-verify, never assume
/// success.
pub fn reserve_appointment(
    conn: &mut Connection,
    appt: &NewAppointment,
) -> Result<ReserveOutcome, DatabaseError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let end_minute = appt.start_minute + appt.duration_minutes;
    let conflicts: i64 = tx.query_row(
        &format!(
            "SELECT COUNT(*) FROM appointments
             WHERE tenant_id = ?1
               AND provider_id IS ?2
               AND date = ?3
               AND status IN {OCCUPYING}
               AND start_minute < ?4
               AND ?5 < start_minute + duration_minutes"
        ),
        params![
            appt.tenant_id.to_string(),
            appt.provider_id.map(|id| id.to_string()),
            appt.date.to_string(),
            end_minute,
            appt.start_minute,
        ],
        |row| row.get(0),
    )?;

    if conflicts > 0 {
        // Dropping the transaction rolls back; nothing was written.
        return Ok(ReserveOutcome::Conflict);
    }

    let id = Uuid::new_v4();
    let inserted = tx.execute(
        "INSERT INTO appointments
             (id, tenant_id, provider_id, patient_id, service_id,
              date, start_minute, duration_minutes, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id.to_string(),
            appt.tenant_id.to_string(),
            appt.provider_id.map(|id| id.to_string()),
            appt.patient_id.map(|id| id.to_string()),
            appt.service_id.map(|id| id.to_string()),
            appt.date.to_string(),
            appt.start_minute,
            appt.duration_minutes,
            appt.status.as_str(),
        ],
    );

    match inserted {
        Ok(_) => {
            tx.commit()?;
            Ok(ReserveOutcome::Booked(id))
        }
        Err(e) => {
            let err = DatabaseError::from(e);
            if err.is_constraint_violation() {
                Ok(ReserveOutcome::Conflict)
            } else {
                Err(err)
            }
        }
    }
}

/// All occupied intervals for one calendar on one day, ascending.
/// `provider_id = None` reads the tenant-wide null-provider calendar.
pub fn occupied_intervals(
    conn: &Connection,
    tenant_id: &Uuid,
    provider_id: Option<&Uuid>,
    date: NaiveDate,
) -> Result<Vec<OccupiedInterval>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT start_minute, duration_minutes FROM appointments
         WHERE tenant_id = ?1
           AND provider_id IS ?2
           AND date = ?3
           AND status IN {OCCUPYING}
         ORDER BY start_minute"
    ))?;

    let rows = stmt.query_map(
        params![
            tenant_id.to_string(),
            provider_id.map(|id| id.to_string()),
            date.to_string(),
        ],
        |row| {
            let start: u32 = row.get(0)?;
            let duration: u32 = row.get(1)?;
            Ok(OccupiedInterval {
                start_minute: start,
                end_minute: start + duration,
            })
        },
    )?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Record provider unavailability (vacation, lunch). Called by the
/// external block-time operation; goes through the same atomic path so a
/// block can never land on top of an existing booking.
pub fn insert_blocked_period(
    conn: &mut Connection,
    tenant_id: &Uuid,
    provider_id: Option<&Uuid>,
    date: NaiveDate,
    start_minute: u32,
    duration_minutes: u32,
) -> Result<ReserveOutcome, DatabaseError> {
    reserve_appointment(
        conn,
        &NewAppointment {
            tenant_id: *tenant_id,
            provider_id: provider_id.copied(),
            patient_id: None,
            service_id: None,
            date,
            start_minute,
            duration_minutes,
            status: AppointmentStatus::Blocked,
        },
    )
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, provider_id, patient_id, service_id,
                date, start_minute, duration_minutes, status
         FROM appointments WHERE id = ?1",
    )?;
    match stmt.query_row(params![id.to_string()], map_appointment) {
        Ok(appt) => Ok(Some(appt)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Status transitions (cancellation, completion) are performed by
/// collaborators outside the reservation core; this is their entry point.
pub fn update_appointment_status(
    conn: &Connection,
    id: &Uuid,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn map_appointment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    let parse_opt = |value: Option<String>| {
        value.and_then(|s| Uuid::parse_str(&s).ok())
    };
    Ok(Appointment {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        tenant_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        provider_id: parse_opt(row.get(2)?),
        patient_id: parse_opt(row.get(3)?),
        service_id: parse_opt(row.get(4)?),
        date: NaiveDate::parse_from_str(&row.get::<_, String>(5)?, "%Y-%m-%d")
            .unwrap_or_default(),
        start_minute: row.get(6)?,
        duration_minutes: row.get(7)?,
        status: row
            .get::<_, String>(8)?
            .parse()
            .unwrap_or(AppointmentStatus::Pending),
    })
}
