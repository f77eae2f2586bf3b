use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::{Entry, EntryStatus};
use crate::error::HomeCtrlError;
use crate::middleware::json::JsonBody;
use crate::router::HomeCtrlState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct HiddenRequest {
    pub hidden: bool,
}

/// Only the literal `true` includes hidden entries; any other value is false.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub include_hidden: Option<String>,
}

impl ListQuery {
    pub fn include_hidden(&self) -> bool {
        self.include_hidden.as_deref() == Some("true")
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), HomeCtrlError> {
    if value.is_empty() {
        return Err(HomeCtrlError::Validation(format!("`{field}` is required")));
    }
    Ok(())
}

/// POST /api/v1/keyvalue
pub async fn create(
    State(state): State<HomeCtrlState>,
    JsonBody(req): JsonBody<CreateRequest>,
) -> Result<(StatusCode, Json<Entry>), HomeCtrlError> {
    require_non_empty("key", &req.key)?;
    require_non_empty("value", &req.value)?;
    let entry = state.entries.create(&req.key, &req.value).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/keyvalue/{key}
pub async fn get_entry(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
) -> Result<Json<Entry>, HomeCtrlError> {
    state
        .entries
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(|| HomeCtrlError::NotFound(format!("key `{key}` not found")))
}

/// PUT /api/v1/keyvalue/{key}
pub async fn update(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
    JsonBody(req): JsonBody<UpdateRequest>,
) -> Result<Json<Entry>, HomeCtrlError> {
    require_non_empty("value", &req.value)?;
    Ok(Json(state.entries.update(&key, &req.value).await?))
}

/// PATCH /api/v1/keyvalue/{key}/status
pub async fn set_status(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<Entry>, HomeCtrlError> {
    let status: EntryStatus = req.status.parse()?;
    Ok(Json(state.entries.set_status(&key, status).await?))
}

/// PATCH /api/v1/keyvalue/{key}/hidden
pub async fn set_hidden(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
    JsonBody(req): JsonBody<HiddenRequest>,
) -> Result<Json<Entry>, HomeCtrlError> {
    Ok(Json(state.entries.set_hidden(&key, req.hidden).await?))
}

/// DELETE /api/v1/keyvalue/{key}
pub async fn delete_entry(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HomeCtrlError> {
    state.entries.delete(&key).await?;
    Ok(Json(json!({ "message": "Key-value pair deleted successfully" })))
}

/// GET /api/v1/keyvalue?include_hidden=true
pub async fn list(
    State(state): State<HomeCtrlState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Entry>>, HomeCtrlError> {
    Ok(Json(state.entries.list(query.include_hidden()).await?))
}

/// GET /api/v1/keyvalue/{key}/status
pub async fn check_status(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HomeCtrlError> {
    let Some(status) = state.entries.check_status(&key).await? else {
        return Err(HomeCtrlError::NotFound(format!("key `{key}` not found")));
    };
    Ok(Json(json!({
        "key": key,
        "status": status,
        "exists": true,
    })))
}

/// GET /api/v1/keyvalue/{key}/exists
pub async fn check_exists(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HomeCtrlError> {
    let exists = state.entries.check_exists(&key).await?;
    Ok(Json(json!({
        "key": key,
        "exists": exists,
    })))
}
