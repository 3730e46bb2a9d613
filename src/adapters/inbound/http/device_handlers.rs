use super::error::ApiError;
use super::state::AppState;
use crate::application::dto::{DeviceList, DeviceListQuery, DeviceVersionInfo, VersionSummary};
use crate::vulnerability_scanning::domain::{Device, DevicePatch, NewDevice};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub(crate) struct NameQuery {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersionQuery {
    version: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BrandQuery {
    brand: String,
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    q: String,
}

pub(crate) async fn create_device(
    State(state): State<AppState>,
    payload: Result<Json<NewDevice>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Device>)> {
    let Json(new_device) = payload?;
    let device = state.devices.create(new_device).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

pub(crate) async fn list_devices(
    State(state): State<AppState>,
    query: Result<Query<DeviceListQuery>, QueryRejection>,
) -> ApiResult<Json<DeviceList>> {
    let Query(query) = query?;
    Ok(Json(state.devices.list(&query).await?))
}

pub(crate) async fn get_device(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Device>> {
    let Path(id) = id?;
    Ok(Json(state.devices.get(id).await?))
}

pub(crate) async fn update_device(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DevicePatch>, JsonRejection>,
) -> ApiResult<Json<Device>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    Ok(Json(state.devices.update(id, patch).await?))
}

pub(crate) async fn delete_device(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.devices.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn deactivate_device(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Device>> {
    let Path(id) = id?;
    Ok(Json(state.devices.deactivate(id).await?))
}

pub(crate) async fn search_by_name(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Device>>> {
    let Query(query) = query?;
    Ok(Json(state.devices.search_by_name(&query.name).await?))
}

pub(crate) async fn search_by_version(
    State(state): State<AppState>,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Device>>> {
    let Query(query) = query?;
    Ok(Json(state.devices.search_by_version(&query.version).await?))
}

pub(crate) async fn search_by_brand(
    State(state): State<AppState>,
    query: Result<Query<BrandQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Device>>> {
    let Query(query) = query?;
    Ok(Json(
        state
            .devices
            .search_by_brand(&query.brand, query.model.as_deref())
            .await?,
    ))
}

pub(crate) async fn search_devices(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Device>>> {
    let Query(query) = query?;
    Ok(Json(state.devices.search(&query.q).await?))
}

pub(crate) async fn version_summary(
    State(state): State<AppState>,
) -> ApiResult<Json<VersionSummary>> {
    Ok(Json(state.devices.version_summary().await?))
}

pub(crate) async fn version_list(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DeviceVersionInfo>>> {
    Ok(Json(state.devices.version_list().await?))
}
