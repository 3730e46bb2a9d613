use super::error::ApiError;
use super::state::AppState;
use crate::application::dto::{
    BatchScanRequest, BatchScanResponse, ScanDetails, ScanListQuery, ScanPage, ScanRequest,
};
use crate::vulnerability_scanning::domain::Scan;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiError>;

/// Starts a background scan; the returned scan is `in_progress`
pub(crate) async fn trigger_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Scan>)> {
    let Json(request) = payload?;
    let scan = state.scans.trigger(request.device_id).await?;
    Ok((StatusCode::ACCEPTED, Json(scan)))
}

pub(crate) async fn trigger_batch_scan(
    State(state): State<AppState>,
    payload: Result<Json<BatchScanRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BatchScanResponse>)> {
    let Json(request) = payload?;
    let response = state.scans.trigger_batch(&request.device_ids).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

pub(crate) async fn list_scans(
    State(state): State<AppState>,
    query: Result<Query<ScanListQuery>, QueryRejection>,
) -> ApiResult<Json<ScanPage>> {
    let Query(query) = query?;
    Ok(Json(state.scans.list(&query).await?))
}

pub(crate) async fn get_scan(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ScanDetails>> {
    let Path(id) = id?;
    Ok(Json(state.scans.get(id).await?))
}
