use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum HomeCtrlError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<figment::Error> for HomeCtrlError {
    fn from(e: figment::Error) -> Self {
        HomeCtrlError::Config(Box::new(e))
    }
}

impl From<argon2::password_hash::Error> for HomeCtrlError {
    fn from(e: argon2::password_hash::Error) -> Self {
        HomeCtrlError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for HomeCtrlError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            HomeCtrlError::Validation(msg) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: msg,
                };
                (status, body)
            }
            HomeCtrlError::NotFound(msg) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: msg,
                };
                (status, body)
            }
            HomeCtrlError::Conflict(msg) => {
                let status = StatusCode::CONFLICT;
                let body = ApiErrorBody {
                    code: "CONFLICT".to_string(),
                    message: msg,
                };
                (status, body)
            }
            HomeCtrlError::Unauthorized => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication required.".to_string(),
                };
                (status, body)
            }
            HomeCtrlError::InvalidCredentials => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Invalid username or password.".to_string(),
                };
                (status, body)
            }
            err @ (HomeCtrlError::DatabaseError(_)
            | HomeCtrlError::PasswordHash(_)
            | HomeCtrlError::Config(_)
            | HomeCtrlError::Io(_)
            | HomeCtrlError::Join(_)) => {
                error!(error = %err, "request failed with internal error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
