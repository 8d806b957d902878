use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Tenant, TimeRange, WeeklySchedule};

pub fn insert_tenant(conn: &Connection, tenant: &Tenant) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO tenants (id, name) VALUES (?1, ?2)",
        params![tenant.id.to_string(), tenant.name],
    )?;
    Ok(())
}

pub fn get_tenant(conn: &Connection, id: &Uuid) -> Result<Option<Tenant>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM tenants WHERE id = ?1")?;
    match stmt.query_row(params![id.to_string()], |row| {
        Ok(Tenant {
            id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap_or_default(),
            name: row.get(1)?,
        })
    }) {
        Ok(tenant) => Ok(Some(tenant)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replace the operating ranges for one weekday. An empty slice closes
/// the day. Seed helper for the external practice-configuration system.
pub fn set_day_hours(
    conn: &Connection,
    tenant_id: &Uuid,
    weekday: u32,
    ranges: &[TimeRange],
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM tenant_hours WHERE tenant_id = ?1 AND weekday = ?2",
        params![tenant_id.to_string(), weekday],
    )?;
    for range in ranges {
        conn.execute(
            "INSERT INTO tenant_hours (tenant_id, weekday, start_minute, end_minute)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                tenant_id.to_string(),
                weekday,
                range.start_minute,
                range.end_minute
            ],
        )?;
    }
    Ok(())
}

/// Load the weekly operating hours as a read-only snapshot. Days with no
/// rows are closed.
pub fn get_weekly_schedule(
    conn: &Connection,
    tenant_id: &Uuid,
) -> Result<WeeklySchedule, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT weekday, start_minute, end_minute FROM tenant_hours
         WHERE tenant_id = ?1
         ORDER BY weekday, start_minute",
    )?;

    let mut schedule = WeeklySchedule::closed();
    let rows = stmt.query_map(params![tenant_id.to_string()], |row| {
        Ok((
            row.get::<_, u32>(0)?,
            row.get::<_, u32>(1)?,
            row.get::<_, u32>(2)?,
        ))
    })?;

    for row in rows {
        let (weekday, start, end) = row?;
        let day = &mut schedule.days[weekday as usize % 7];
        day.enabled = true;
        day.ranges.push(TimeRange::new(start, end));
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::NaiveDate;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_tenant(conn: &Connection) -> Uuid {
        let id = Uuid::new_v4();
        insert_tenant(
            conn,
            &Tenant {
                id,
                name: "Clínica Centro".into(),
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn tenant_insert_and_retrieve() {
        let conn = test_db();
        let id = make_tenant(&conn);
        let tenant = get_tenant(&conn, &id).unwrap().unwrap();
        assert_eq!(tenant.name, "Clínica Centro");
    }

    #[test]
    fn unknown_tenant_is_none() {
        let conn = test_db();
        assert!(get_tenant(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn schedule_round_trip_multi_range() {
        let conn = test_db();
        let tenant_id = make_tenant(&conn);

        // Monday: morning + afternoon with a lunch break
        set_day_hours(
            &conn,
            &tenant_id,
            0,
            &[TimeRange::new(540, 780), TimeRange::new(900, 1140)],
        )
        .unwrap();

        let schedule = get_weekly_schedule(&conn, &tenant_id).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
        let day = schedule.day(monday);
        assert!(day.enabled);
        assert_eq!(day.ranges.len(), 2);
        assert_eq!(day.ranges[0], TimeRange::new(540, 780));
        assert_eq!(day.ranges[1], TimeRange::new(900, 1140));

        // Other days stay closed
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert!(!schedule.day(tuesday).enabled);
    }

    #[test]
    fn set_day_hours_replaces_existing() {
        let conn = test_db();
        let tenant_id = make_tenant(&conn);

        set_day_hours(&conn, &tenant_id, 2, &[TimeRange::new(540, 1020)]).unwrap();
        set_day_hours(&conn, &tenant_id, 2, &[TimeRange::new(600, 960)]).unwrap();

        let schedule = get_weekly_schedule(&conn, &tenant_id).unwrap();
        assert_eq!(schedule.days[2].ranges, vec![TimeRange::new(600, 960)]);
    }

    #[test]
    fn empty_ranges_close_the_day() {
        let conn = test_db();
        let tenant_id = make_tenant(&conn);

        set_day_hours(&conn, &tenant_id, 4, &[TimeRange::new(540, 1020)]).unwrap();
        set_day_hours(&conn, &tenant_id, 4, &[]).unwrap();

        let schedule = get_weekly_schedule(&conn, &tenant_id).unwrap();
        assert!(!schedule.days[4].enabled);
    }
}
