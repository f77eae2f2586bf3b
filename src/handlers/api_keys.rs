use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::db::ApiKey;
use crate::error::HomeCtrlError;
use crate::middleware::json::JsonBody;
use crate::router::HomeCtrlState;

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub name: String,
    pub expires_in_hours: Option<i64>,
}

/// POST /api/v1/apikeys
pub async fn issue(
    State(state): State<HomeCtrlState>,
    JsonBody(req): JsonBody<IssueRequest>,
) -> Result<(StatusCode, Json<ApiKey>), HomeCtrlError> {
    if req.name.trim().is_empty() {
        return Err(HomeCtrlError::Validation("`name` is required".to_string()));
    }
    let expires_at = match req.expires_in_hours {
        Some(hours) if hours <= 0 => {
            return Err(HomeCtrlError::Validation(
                "`expires_in_hours` must be positive".to_string(),
            ));
        }
        Some(hours) => Some(
            Duration::try_hours(hours)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                .ok_or_else(|| {
                    HomeCtrlError::Validation("`expires_in_hours` is out of range".to_string())
                })?,
        ),
        None => None,
    };
    let api_key = state.credentials.issue_api_key(&req.name, expires_at).await?;
    Ok((StatusCode::CREATED, Json(api_key)))
}

/// GET /api/v1/apikeys
///
/// Secrets are redacted; the full key is only returned when it is issued.
pub async fn list(State(state): State<HomeCtrlState>) -> Result<Json<Vec<ApiKey>>, HomeCtrlError> {
    let keys = state.credentials.list_api_keys().await?;
    Ok(Json(keys.into_iter().map(ApiKey::redacted).collect()))
}

/// DELETE /api/v1/apikeys/{key}
pub async fn revoke(
    State(state): State<HomeCtrlState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, HomeCtrlError> {
    state.credentials.revoke_api_key(&key).await?;
    Ok(Json(json!({ "message": "API key revoked" })))
}
