use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Provider, Service};

pub fn insert_service(conn: &Connection, service: &Service) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO services (id, tenant_id, name, duration_minutes)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            service.id.to_string(),
            service.tenant_id.to_string(),
            service.name,
            service.duration_minutes
        ],
    )?;
    Ok(())
}

/// Look up a service within its tenant. A service id from another tenant
/// is not found — bookings can never cross the tenant boundary.
pub fn get_service(
    conn: &Connection,
    tenant_id: &Uuid,
    service_id: &Uuid,
) -> Result<Option<Service>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, name, duration_minutes FROM services
         WHERE id = ?1 AND tenant_id = ?2",
    )?;
    match stmt.query_row(
        params![service_id.to_string(), tenant_id.to_string()],
        |row| {
            Ok(Service {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                tenant_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
                name: row.get(2)?,
                duration_minutes: row.get(3)?,
            })
        },
    ) {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn insert_provider(conn: &Connection, provider: &Provider) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO providers (id, tenant_id, name, active)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            provider.id.to_string(),
            provider.tenant_id.to_string(),
            provider.name,
            provider.active as i32
        ],
    )?;
    Ok(())
}

pub fn get_provider(
    conn: &Connection,
    tenant_id: &Uuid,
    provider_id: &Uuid,
) -> Result<Option<Provider>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, name, active FROM providers
         WHERE id = ?1 AND tenant_id = ?2",
    )?;
    match stmt.query_row(
        params![provider_id.to_string(), tenant_id.to_string()],
        |row| {
            Ok(Provider {
                id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
                tenant_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap_or_default(),
                name: row.get(2)?,
                active: row.get::<_, i32>(3)? != 0,
            })
        },
    ) {
        Ok(provider) => Ok(Some(provider)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
