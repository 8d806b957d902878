use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::crypto::EncryptedField;
use crate::db::DatabaseError;
use crate::models::Patient;

/// Upsert a patient keyed by `(tenant_id, email_hash)`.
///
/// One statement, so two concurrent first bookings from the same person
/// converge on a single row instead of racing a read-then-branch into
/// duplicates. Returns the id of the surviving row: the caller's fresh
/// id on insert, the existing row's id when the blind index matched and
/// the contact fields were refreshed in place.
pub fn upsert_patient(conn: &Connection, patient: &Patient) -> Result<Uuid, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO patients
             (id, tenant_id, name_enc, email_enc, email_hash, phone_enc, phone_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(tenant_id, email_hash) DO UPDATE SET
             name_enc   = excluded.name_enc,
             email_enc  = excluded.email_enc,
             phone_enc  = excluded.phone_enc,
             phone_hash = excluded.phone_hash,
             updated_at = datetime('now')
         RETURNING id",
    )?;

    let id: String = stmt.query_row(
        params![
            patient.id.to_string(),
            patient.tenant_id.to_string(),
            patient.name_enc.as_str(),
            patient.email_enc.as_str(),
            patient.email_hash,
            patient.phone_enc.as_ref().map(|f| f.as_str().to_string()),
            patient.phone_hash,
        ],
        |row| row.get(0),
    )?;

    Ok(Uuid::parse_str(&id).unwrap_or_default())
}

/// Equality lookup over encrypted emails via the blind index.
pub fn get_patient_by_email_hash(
    conn: &Connection,
    tenant_id: &Uuid,
    email_hash: &str,
) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, name_enc, email_enc, email_hash, phone_enc, phone_hash
         FROM patients WHERE tenant_id = ?1 AND email_hash = ?2",
    )?;
    match stmt.query_row(params![tenant_id.to_string(), email_hash], map_patient) {
        Ok(patient) => Ok(Some(patient)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count_patients(conn: &Connection, tenant_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM patients WHERE tenant_id = ?1",
        params![tenant_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn map_patient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
        tenant_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
        name_enc: EncryptedField::from_stored(row.get(2)?),
        email_enc: EncryptedField::from_stored(row.get(3)?),
        email_hash: row.get(4)?,
        phone_enc: row
            .get::<_, Option<String>>(5)?
            .map(EncryptedField::from_stored),
        phone_hash: row.get(6)?,
    })
}
