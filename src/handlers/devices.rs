use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path, Query};
use crate::models::{Device, DeviceInput, GroupBy};
use crate::pagination::{PAGE_SIZE, PagedResult, SearchQuery, offset_for};
use crate::transfer::{self, EXPORT_FILENAME, ImportSummary};

/// Search and page through devices, ordered by id.
pub async fn search_devices(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PagedResult<Device>>> {
    let page = query.page()?;
    let conn = state.db.get()?;

    let (items, total) = queries::search_devices(
        &conn,
        state.schema,
        query.term(),
        PAGE_SIZE,
        offset_for(page),
    )?;

    Ok(Json(PagedResult::new(items, page, total)))
}

pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Device>> {
    let conn = state.db.get()?;
    let device = queries::get_device_by_id(&conn, id)?
        .ok_or_else(|| AppError::NotFound("Device not found".into()))?;
    Ok(Json(device))
}

pub async fn create_device(
    State(state): State<AppState>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<Device>> {
    let new_device = input.validate(state.schema)?;

    let conn = state.db.get()?;
    let device = queries::create_device(&conn, &new_device)?;

    tracing::info!(id = device.id, serial = %device.serial_number, "created device");

    Ok(Json(device))
}

/// Replace a device. The body must carry the same id as the path.
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<Device>> {
    if input.id != Some(id) {
        return Err(AppError::NotFound("Device not found".into()));
    }

    let new_device = input.validate(state.schema)?;

    let conn = state.db.get()?;
    if !queries::update_device(&conn, id, &new_device)? {
        // Nothing was written: either the row is gone or the write lost a race
        if !queries::device_exists(&conn, id)? {
            return Err(AppError::NotFound("Device not found".into()));
        }
        return Err(AppError::Conflict(format!(
            "Device {} was modified concurrently",
            id
        )));
    }

    tracing::info!(id, "updated device");

    Ok(Json(new_device.with_id(id)))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    /// False when there was nothing to delete
    pub deleted: bool,
}

/// Delete a device. Deleting a missing id succeeds without doing anything.
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>> {
    let conn = state.db.get()?;
    let deleted = queries::delete_device(&conn, id)?;

    if deleted {
        tracing::info!(id, "deleted device");
    } else {
        tracing::debug!(id, "delete of missing device ignored");
    }

    Ok(Json(DeleteResponse {
        success: true,
        deleted,
    }))
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub summary: ImportSummary,
    pub message: String,
}

/// Import devices from a semicolon-delimited CSV body.
pub async fn import_devices(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No file uploaded.".into()));
    }
    let csv = std::str::from_utf8(&body)
        .map_err(|_| AppError::BadRequest("Uploaded file is not valid UTF-8.".into()))?;

    let mut conn = state.db.get()?;
    let summary = transfer::import_csv(&mut conn, csv.as_bytes(), state.schema)?;

    let message = format!("Import completed. Inserted {} devices.", summary.imported);
    Ok(Json(ImportResponse { summary, message }))
}

/// Download every device as `devices_export.csv`.
pub async fn export_devices(State(state): State<AppState>) -> Result<Response> {
    let conn = state.db.get()?;
    let csv = transfer::export_csv(&conn, state.schema)?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        EXPORT_FILENAME
    ))
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub group_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

/// Device counts grouped by type or team, as parallel label/value arrays.
pub async fn device_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartData>> {
    let group_by = GroupBy::from_param(query.group_by.as_deref());

    let conn = state.db.get()?;
    let (labels, values) = queries::count_devices_grouped(&conn, group_by)?
        .into_iter()
        .unzip();

    Ok(Json(ChartData { labels, values }))
}
