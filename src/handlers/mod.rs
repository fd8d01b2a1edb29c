mod devices;

pub use devices::*;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/devices", get(search_devices).post(create_device))
        .route(
            "/devices/import",
            post(import_devices).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/devices/export", get(export_devices))
        .route("/devices/chart", get(device_chart))
        .route(
            "/devices/{id}",
            get(get_device).put(update_device).delete(delete_device),
        )
}

/// The full application with shared state and HTTP layers applied.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    router(max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
