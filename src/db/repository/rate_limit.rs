use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Post-update state of one (source, endpoint) window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub count: u32,
    pub window_start: i64,
}

/// Record a request against the counter and return the updated window.
///
/// A single conditional upsert: first request from a source creates the
/// row at count 1; an elapsed window resets to 1 and restamps the
/// window; otherwise the count advances. Because it is one statement,
/// two simultaneous requests from the same source cannot both read the
/// old count — the store serializes them and each sees its own
/// increment. The caller applies the policy to the returned state.
pub fn bump_rate_limit(
    conn: &Connection,
    source_id: &str,
    endpoint: &str,
    now_epoch: i64,
    window_secs: i64,
) -> Result<WindowState, DatabaseError> {
    let mut stmt = conn.prepare(
        "INSERT INTO rate_limits (source_id, endpoint, count, window_start)
         VALUES (?1, ?2, 1, ?3)
         ON CONFLICT(source_id, endpoint) DO UPDATE SET
             count = CASE
                 WHEN ?3 - window_start >= ?4 THEN 1
                 ELSE count + 1
             END,
             window_start = CASE
                 WHEN ?3 - window_start >= ?4 THEN ?3
                 ELSE window_start
             END
         RETURNING count, window_start",
    )?;

    let state = stmt.query_row(
        params![source_id, endpoint, now_epoch, window_secs],
        |row| {
            Ok(WindowState {
                count: row.get(0)?,
                window_start: row.get(1)?,
            })
        },
    )?;

    Ok(state)
}
