//! Shared helpers for integration tests.
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub use device_inventory::db::{self, AppState, queries};
pub use device_inventory::models::*;

pub const UPLOAD_LIMIT: usize = 1024 * 1024;

/// An in-memory database with the schema applied.
pub fn test_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_db(&conn).unwrap();
    conn
}

/// A file-backed app state; every pooled connection sees the same data.
/// Keep the `TempDir` alive for the duration of the test.
pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub fn new(schema: DeviceSchema) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.db");
        let pool = db::create_pool(path.to_str().unwrap(), 4).unwrap();
        Self {
            state: AppState { db: pool, schema },
            _dir: dir,
        }
    }

    pub fn router(&self) -> Router {
        device_inventory::handlers::app(self.state.clone(), UPLOAD_LIMIT)
    }

    pub fn conn(&self) -> PooledConnection<SqliteConnectionManager> {
        self.state.db.get().unwrap()
    }

    pub fn seed(&self, devices: &[NewDevice]) -> Vec<Device> {
        let conn = self.conn();
        seed(&conn, devices)
    }

    pub async fn request(&self, method: &str, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let response = self
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.request("GET", uri, Body::empty()).await;
        (status, parse_json(&body))
    }

    pub async fn send_json(&self, method: &str, uri: &str, json: Value) -> (StatusCode, Value) {
        let (status, body) = self
            .request(method, uri, Body::from(json.to_string()))
            .await;
        (status, parse_json(&body))
    }

    pub async fn upload_csv(&self, csv: &str) -> (StatusCode, Value) {
        self.upload_bytes(csv.as_bytes()).await
    }

    pub async fn upload_bytes(&self, body: &[u8]) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/devices/import")
                    .header("content-type", "text/csv")
                    .body(Body::from(body.to_vec()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, parse_json(&bytes))
    }
}

fn parse_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("Response should be valid JSON")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn asset_device(serial: &str, model: &str, assigned_to: &str, active: bool) -> NewDevice {
    NewDevice {
        serial_number: serial.to_string(),
        model: model.to_string(),
        assigned_to: assigned_to.to_string(),
        purchase_date: Some(date(2024, 1, 15)),
        is_active: Some(active),
        device_type: None,
        team: None,
    }
}

pub fn team_device(serial: &str, model: &str, device_type: &str, team: &str) -> NewDevice {
    NewDevice {
        serial_number: serial.to_string(),
        model: model.to_string(),
        assigned_to: String::new(),
        purchase_date: None,
        is_active: None,
        device_type: Some(device_type.to_string()),
        team: Some(team.to_string()),
    }
}

pub fn seed(conn: &Connection, devices: &[NewDevice]) -> Vec<Device> {
    devices
        .iter()
        .map(|d| queries::create_device(conn, d).unwrap())
        .collect()
}

/// `count` asset devices named SN-0001, SN-0002, ...
pub fn numbered_devices(count: usize) -> Vec<NewDevice> {
    (1..=count)
        .map(|n| asset_device(&format!("SN-{:04}", n), "Latitude", "Pool", n % 2 == 0))
        .collect()
}
