//! CSV bulk import and export of devices.

mod export;
mod import;

pub use export::*;
pub use import::*;

/// Field separator for import and export files.
pub const DELIMITER: char = ';';

/// Columns every data line must carry.
pub const COLUMN_COUNT: usize = 5;

/// Download name for exported files.
pub const EXPORT_FILENAME: &str = "devices_export.csv";
