use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::models::{Device, DeviceSchema};

use super::DELIMITER;

/// Render devices as a semicolon-delimited document in the same column
/// layout the importer reads.
///
/// Values are written verbatim: a field containing `;` or a line break
/// produces a line the importer will split differently.
pub fn write_csv(devices: &[Device], schema: DeviceSchema) -> String {
    let delimiter = DELIMITER.to_string();
    let mut csv = schema.csv_columns().join(delimiter.as_str());
    csv.push('\n');

    for device in devices {
        let fields = match schema {
            DeviceSchema::Asset => [
                device.serial_number.clone(),
                device.model.clone(),
                device.assigned_to.clone(),
                device
                    .purchase_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                device.is_active.map(|b| b.to_string()).unwrap_or_default(),
            ],
            DeviceSchema::Team => [
                device.serial_number.clone(),
                device.model.clone(),
                device.assigned_to.clone(),
                device.device_type.clone().unwrap_or_default(),
                device.team.clone().unwrap_or_default(),
            ],
        };
        csv.push_str(&fields.join(delimiter.as_str()));
        csv.push('\n');
    }

    csv
}

/// Export every stored device, in storage order.
pub fn export_csv(conn: &Connection, schema: DeviceSchema) -> Result<String> {
    let devices = queries::list_devices(conn)?;
    tracing::debug!(count = devices.len(), "exporting devices");
    Ok(write_csv(&devices, schema))
}
