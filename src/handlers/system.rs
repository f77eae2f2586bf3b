use axum::{Json, http::StatusCode, http::Uri, response::IntoResponse};
use serde_json::{Value, json};

/// GET /health and /api/v1/health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Service is running",
    }))
}

/// GET /api/v1/version
pub async fn version() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "path": uri.path(),
        })),
    )
}
