use super::device_handlers as devices;
use super::error::ApiError;
use super::middleware::{cors_middleware, request_tracing_middleware};
use super::scan_handlers as scans;
use super::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the VulnTrack device vulnerability tracker!",
        "version": env!("CARGO_PKG_VERSION"),
        "api": "/api/v1",
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": state.storage,
        "pending_scans": state.scans.pending_scans(),
    }))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/devices",
            post(devices::create_device).get(devices::list_devices),
        )
        .route(
            "/devices/search/by-name",
            get(devices::search_by_name),
        )
        .route(
            "/devices/search/by-version",
            get(devices::search_by_version),
        )
        .route(
            "/devices/search/by-brand",
            get(devices::search_by_brand),
        )
        .route("/devices/search/general", get(devices::search_devices))
        .route("/devices/versions/summary", get(devices::version_summary))
        .route("/devices/versions/list", get(devices::version_list))
        .route(
            "/devices/:id",
            get(devices::get_device)
                .put(devices::update_device)
                .delete(devices::delete_device),
        )
        .route("/devices/:id/deactivate", patch(devices::deactivate_device))
        .route("/scans", post(scans::trigger_scan).get(scans::list_scans))
        .route("/scans/batch", post(scans::trigger_batch_scan))
        .route("/scans/:id", get(scans::get_scan))
}

/// Builds the full application router with its middleware stack
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .layer(from_fn(request_tracing_middleware))
        .with_state(state)
}
