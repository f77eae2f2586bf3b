use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::error::HomeCtrlError;
use crate::middleware::auth::Authenticated;
use crate::middleware::json::JsonBody;
use crate::router::HomeCtrlState;
use crate::service::auth_gate::bearer_token;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
    pub message: String,
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<HomeCtrlState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, HomeCtrlError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(HomeCtrlError::Validation(
            "username and password are required".to_string(),
        ));
    }

    if !state.credentials.verify(&req.username, &req.password).await {
        info!(username = %req.username, "login rejected");
        return Err(HomeCtrlError::InvalidCredentials);
    }

    let session = state.sessions.create_session(&req.username).await?;
    info!(username = %req.username, "login succeeded");

    Ok(Json(LoginResponse {
        token: session.session_id,
        token_type: "bearer".to_string(),
        expires_in: state.sessions.ttl().num_seconds(),
        username: session.username,
        message: "Login successful".to_string(),
    }))
}

/// POST /api/v1/auth/logout
///
/// Succeeds whether or not a bearer token was sent or still valid.
pub async fn logout(
    State(state): State<HomeCtrlState>,
    headers: HeaderMap,
) -> Result<Json<Value>, HomeCtrlError> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(&token).await?;
    }
    Ok(Json(json!({ "message": "Logout successful" })))
}

/// GET /api/v1/me
pub async fn me(Authenticated(principal): Authenticated) -> Json<Value> {
    Json(json!({
        "username": principal.username(),
        "auth_method": principal.method(),
        "message": "You are authenticated!",
    }))
}
