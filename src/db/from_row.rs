//! Row mapping for query results.

use rusqlite::{Connection, OptionalExtension, Params, Row};

use crate::error::Result;
use crate::models::Device;

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

pub const DEVICE_COLS: &str =
    "id, serial_number, model, assigned_to, purchase_date, is_active, device_type, team";

impl FromRow for Device {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Device {
            id: row.get(0)?,
            serial_number: row.get(1)?,
            model: row.get(2)?,
            assigned_to: row.get(3)?,
            purchase_date: row.get(4)?,
            is_active: row.get(5)?,
            device_type: row.get(6)?,
            team: row.get(7)?,
        })
    }
}

/// Run a query expected to return at most one row.
pub fn query_one<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Run a query and map every row.
pub fn query_all<T: FromRow>(conn: &Connection, sql: &str, params: impl Params) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
