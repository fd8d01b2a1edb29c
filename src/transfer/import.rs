use std::io::BufRead;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::error::Result;
use crate::models::{DeviceSchema, NewDevice, RawDevice};

use super::{COLUMN_COUNT, DELIMITER};

/// Outcome of parsing an upload: the rows that passed validation and a
/// line-addressed report of the ones that did not.
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub devices: Vec<NewDevice>,
    pub errors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Parse a semicolon-delimited device file.
///
/// Line 1 is a header and is skipped without inspection. Every later line
/// is validated on its own; a bad line adds one or more `Line {n}: ...`
/// messages and is left out, while the remaining lines keep being processed.
/// Only I/O failures abort the parse.
pub fn parse_csv<R: BufRead>(reader: R, schema: DeviceSchema) -> Result<ParsedImport> {
    let mut parsed = ParsedImport::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;

        if line_number == 1 {
            continue;
        }

        match parse_line(&line, schema) {
            Ok(device) => parsed.devices.push(device),
            Err(messages) => parsed.errors.extend(
                messages
                    .into_iter()
                    .map(|msg| format!("Line {}: {}", line_number, msg)),
            ),
        }
    }

    Ok(parsed)
}

/// Validate one data line. On failure returns every problem found on it.
fn parse_line(line: &str, schema: DeviceSchema) -> std::result::Result<NewDevice, Vec<String>> {
    if line.trim().is_empty() {
        return Err(vec!["empty.".to_string()]);
    }

    let values: Vec<&str> = line.split(DELIMITER).collect();
    if values.len() < COLUMN_COUNT {
        return Err(vec![format!(
            "wrong column count ({}/{}).",
            values.len(),
            COLUMN_COUNT
        )]);
    }

    let raw = match schema {
        DeviceSchema::Asset => RawDevice {
            serial_number: values[0],
            model: values[1],
            assigned_to: values[2],
            purchase_date: values[3],
            is_active: values[4],
            ..Default::default()
        },
        DeviceSchema::Team => RawDevice {
            serial_number: values[0],
            model: values[1],
            assigned_to: values[2],
            device_type: values[3],
            team: values[4],
            ..Default::default()
        },
    };

    raw.validate(schema)
        .map_err(|errors| errors.into_iter().map(|e| e.message).collect())
}

/// Parse a device file and insert every valid row in one transaction.
///
/// Row errors are returned in the summary rather than failing the import.
pub fn import_csv<R: BufRead>(
    conn: &mut Connection,
    reader: R,
    schema: DeviceSchema,
) -> Result<ImportSummary> {
    let parsed = parse_csv(reader, schema)?;
    let imported = queries::insert_devices(conn, &parsed.devices)?;

    tracing::info!(
        imported,
        rejected_lines = parsed.errors.len(),
        "CSV import finished"
    );

    Ok(ImportSummary {
        imported,
        errors: parsed.errors,
    })
}
