mod from_row;
pub mod queries;

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;

use crate::error::Result;
use crate::models::DeviceSchema;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub schema: DeviceSchema,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS devices (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    serial_number TEXT NOT NULL,
    model TEXT NOT NULL,
    assigned_to TEXT NOT NULL DEFAULT '',
    purchase_date TEXT,
    is_active INTEGER,
    device_type TEXT,
    team TEXT
);
";

/// Replace SQLite's ASCII-only `lower()` with Unicode lowercasing so search
/// folds the same way as the Rust side folds the term.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let lowered = match ctx.get_raw(0) {
                ValueRef::Null => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                    Some(String::from_utf8_lossy(bytes).to_lowercase())
                }
            };
            Ok(lowered)
        },
    )
}

/// Create the schema if it does not exist yet and register the custom SQL
/// functions on this connection. Safe to call on every start.
pub fn init_db(conn: &Connection) -> Result<()> {
    register_functions(conn)?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Build a connection pool over a SQLite file and initialize its schema.
pub fn create_pool(path: &str, max_size: u32) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path)
        .with_init(|c| {
            c.execute_batch("PRAGMA busy_timeout = 5000;")?;
            register_functions(c)
        });
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)?;

    let conn = pool.get()?;
    // WAL lets readers proceed while an import transaction is writing
    conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
    init_db(&conn)?;

    Ok(pool)
}
