use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::{AppError, FieldError, Result};

/// Which optional field set the inventory tracks.
///
/// The `devices` table stores the union of both sets; the schema decides
/// which columns are required, searched, imported and exported.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceSchema {
    /// Purchase date and active flag
    #[default]
    Asset,
    /// Device type and owning team
    Team,
}

impl DeviceSchema {
    /// CSV column names, in import and export order.
    pub fn csv_columns(&self) -> [&'static str; 5] {
        match self {
            DeviceSchema::Asset => [
                "SerialNumber",
                "Model",
                "AssignedTo",
                "PurchaseDate",
                "IsActive",
            ],
            DeviceSchema::Team => ["SerialNumber", "Model", "AssignedTo", "DeviceType", "Team"],
        }
    }
}

/// Attribute the chart endpoint groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum GroupBy {
    Type,
    Team,
}

impl GroupBy {
    /// Unknown or missing values fall back to grouping by team.
    pub fn from_param(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(GroupBy::Team)
    }

    pub fn column(&self) -> &'static str {
        match self {
            GroupBy::Type => "device_type",
            GroupBy::Team => "team",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub serial_number: String,
    pub model: String,
    pub assigned_to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

/// A validated device ready to be written. Produced only by
/// [`RawDevice::validate`], so storage never sees an invalid record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDevice {
    pub serial_number: String,
    pub model: String,
    pub assigned_to: String,
    pub purchase_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub device_type: Option<String>,
    pub team: Option<String>,
}

impl NewDevice {
    pub fn with_id(self, id: i64) -> Device {
        Device {
            id,
            serial_number: self.serial_number,
            model: self.model,
            assigned_to: self.assigned_to,
            purchase_date: self.purchase_date,
            is_active: self.is_active,
            device_type: self.device_type,
            team: self.team,
        }
    }
}

/// Device submitted through the JSON API (create and whole-record update).
#[derive(Debug, Default, Deserialize)]
pub struct DeviceInput {
    /// Must match the path id on update; ignored on create
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Same date formats the CSV import accepts
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl DeviceInput {
    pub fn validate(&self, schema: DeviceSchema) -> Result<NewDevice> {
        let is_active = match self.is_active {
            Some(true) => "true",
            Some(false) => "false",
            None => "",
        };
        RawDevice {
            serial_number: self.serial_number.as_deref().unwrap_or_default(),
            model: self.model.as_deref().unwrap_or_default(),
            assigned_to: self.assigned_to.as_deref().unwrap_or_default(),
            purchase_date: self.purchase_date.as_deref().unwrap_or_default(),
            is_active,
            device_type: self.device_type.as_deref().unwrap_or_default(),
            team: self.team.as_deref().unwrap_or_default(),
        }
        .validate(schema)
        .map_err(AppError::Validation)
    }
}

/// Untyped field text as submitted, shared by the JSON API and CSV import.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawDevice<'a> {
    pub serial_number: &'a str,
    pub model: &'a str,
    pub assigned_to: &'a str,
    pub purchase_date: &'a str,
    pub is_active: &'a str,
    pub device_type: &'a str,
    pub team: &'a str,
}

impl RawDevice<'_> {
    /// Trims every field and checks the schema's required fields.
    ///
    /// Every failing rule produces its own `FieldError`, in column order.
    pub fn validate(&self, schema: DeviceSchema) -> std::result::Result<NewDevice, Vec<FieldError>> {
        let mut errors = Vec::new();

        let serial_number = self.serial_number.trim();
        let model = self.model.trim();
        let assigned_to = self.assigned_to.trim();

        if serial_number.is_empty() {
            errors.push(FieldError::new("serial_number", "SerialNumber missing."));
        }
        if model.is_empty() {
            errors.push(FieldError::new("model", "Model missing."));
        }

        let mut device = NewDevice {
            serial_number: serial_number.to_string(),
            model: model.to_string(),
            assigned_to: assigned_to.to_string(),
            purchase_date: None,
            is_active: None,
            device_type: None,
            team: None,
        };

        match schema {
            DeviceSchema::Asset => {
                let raw_date = self.purchase_date.trim();
                device.purchase_date = parse_date(raw_date);
                if device.purchase_date.is_none() {
                    errors.push(FieldError::new(
                        "purchase_date",
                        format!("PurchaseDate invalid ({}).", raw_date),
                    ));
                }

                let raw_active = self.is_active.trim();
                device.is_active = parse_bool(raw_active);
                if device.is_active.is_none() {
                    errors.push(FieldError::new(
                        "is_active",
                        format!("IsActive must be true/false ({}).", raw_active),
                    ));
                }
            }
            DeviceSchema::Team => {
                let device_type = self.device_type.trim();
                if device_type.is_empty() {
                    errors.push(FieldError::new("device_type", "DeviceType missing."));
                }
                device.device_type = Some(device_type.to_string());
                device.team = Some(self.team.trim().to_string());
            }
        }

        if errors.is_empty() {
            Ok(device)
        } else {
            Err(errors)
        }
    }
}

/// Parse a calendar date. Accepts `yyyy-MM-dd`, `yyyy/MM/dd`, `dd/MM/yyyy`,
/// `yyyy-MM-dd HH:mm:ss` and RFC 3339 timestamps (time part dropped).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Parse `true` / `false`, ignoring ASCII case.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
