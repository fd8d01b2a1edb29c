use rusqlite::{Connection, params, types::Value};

use crate::error::Result;
use crate::models::{Device, DeviceSchema, GroupBy, NewDevice};

use super::from_row::{DEVICE_COLS, query_all, query_one};

const INSERT_DEVICE: &str = "INSERT INTO devices (serial_number, model, assigned_to, purchase_date, is_active, device_type, team)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// SQL expressions searched for a term, each already rendered as text.
/// The active flag is searchable as the words `true` / `false`.
fn search_columns(schema: DeviceSchema) -> &'static [&'static str] {
    match schema {
        DeviceSchema::Asset => &[
            "serial_number",
            "model",
            "assigned_to",
            "CASE is_active WHEN 1 THEN 'true' WHEN 0 THEN 'false' ELSE '' END",
        ],
        DeviceSchema::Team => &[
            "serial_number",
            "model",
            "assigned_to",
            "COALESCE(device_type, '')",
            "COALESCE(team, '')",
        ],
    }
}

// ============ Devices ============

pub fn create_device(conn: &Connection, input: &NewDevice) -> Result<Device> {
    conn.execute(
        INSERT_DEVICE,
        params![
            &input.serial_number,
            &input.model,
            &input.assigned_to,
            input.purchase_date,
            input.is_active,
            &input.device_type,
            &input.team
        ],
    )?;

    Ok(input.clone().with_id(conn.last_insert_rowid()))
}

pub fn get_device_by_id(conn: &Connection, id: i64) -> Result<Option<Device>> {
    query_one(
        conn,
        &format!("SELECT {} FROM devices WHERE id = ?1", DEVICE_COLS),
        params![id],
    )
}

pub fn device_exists(conn: &Connection, id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM devices WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Replace every field of an existing device. Returns false when no row
/// with that id exists.
pub fn update_device(conn: &Connection, id: i64, input: &NewDevice) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE devices SET serial_number = ?1, model = ?2, assigned_to = ?3, purchase_date = ?4,
                is_active = ?5, device_type = ?6, team = ?7
         WHERE id = ?8",
        params![
            &input.serial_number,
            &input.model,
            &input.assigned_to,
            input.purchase_date,
            input.is_active,
            &input.device_type,
            &input.team,
            id
        ],
    )?;
    Ok(affected > 0)
}

pub fn delete_device(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM devices WHERE id = ?1", params![id])?;
    Ok(deleted > 0)
}

/// All devices in storage order (no explicit sort).
pub fn list_devices(conn: &Connection) -> Result<Vec<Device>> {
    query_all(
        conn,
        &format!("SELECT {} FROM devices", DEVICE_COLS),
        [],
    )
}

/// Filtered page of devices ordered by id, plus the filtered total.
///
/// A term matches when any searchable column contains it as a literal
/// substring, compared in lowercase (Unicode `lower()` from `register_functions`).
pub fn search_devices(
    conn: &Connection,
    schema: DeviceSchema,
    term: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Device>, i64)> {
    let mut where_clause = String::new();
    let mut filter_params: Vec<Value> = Vec::new();

    if let Some(term) = term {
        let conditions: Vec<String> = search_columns(schema)
            .iter()
            .map(|col| format!("instr(lower({}), ?1) > 0", col))
            .collect();
        where_clause = format!("WHERE {}", conditions.join(" OR "));
        filter_params.push(term.to_lowercase().into());
    }

    let count_sql = format!("SELECT COUNT(*) FROM devices {}", where_clause);
    let total: i64 = conn.query_row(
        &count_sql,
        rusqlite::params_from_iter(filter_params.iter()),
        |row| row.get(0),
    )?;

    let next = filter_params.len() + 1;
    let select_sql = format!(
        "SELECT {} FROM devices {} ORDER BY id ASC LIMIT ?{} OFFSET ?{}",
        DEVICE_COLS,
        where_clause,
        next,
        next + 1
    );
    let mut select_params = filter_params;
    select_params.push(limit.into());
    select_params.push(offset.into());

    let items = query_all(
        conn,
        &select_sql,
        rusqlite::params_from_iter(select_params),
    )?;

    Ok((items, total))
}

/// Insert a batch of devices in a single transaction. Either every row is
/// written or none is.
pub fn insert_devices(conn: &mut Connection, devices: &[NewDevice]) -> Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(INSERT_DEVICE)?;
        for device in devices {
            stmt.execute(params![
                &device.serial_number,
                &device.model,
                &device.assigned_to,
                device.purchase_date,
                device.is_active,
                &device.device_type,
                &device.team
            ])?;
        }
    }
    tx.commit()?;
    Ok(devices.len())
}

/// Device counts per distinct value of the grouping column. Values are
/// compared exactly; a missing value groups under the empty string.
pub fn count_devices_grouped(conn: &Connection, group_by: GroupBy) -> Result<Vec<(String, i64)>> {
    let sql = format!(
        "SELECT COALESCE({col}, ''), COUNT(*) FROM devices GROUP BY COALESCE({col}, '')",
        col = group_by.column()
    );
    let mut stmt = conn.prepare(&sql)?;
    let groups = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(groups)
}
