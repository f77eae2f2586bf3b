use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::HomeCtrlError;
use crate::router::HomeCtrlState;
use crate::service::auth_gate::Principal;

/// Admit the request through the auth gate or answer 401 before any
/// protected handler runs. The admitted [`Principal`] is stored in the
/// request extensions.
pub async fn require_auth(
    State(state): State<HomeCtrlState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HomeCtrlError> {
    let principal = state
        .gate
        .evaluate(req.headers())
        .await
        .ok_or(HomeCtrlError::Unauthorized)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Extractor for handlers behind [`require_auth`].
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = HomeCtrlError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(Authenticated)
            .ok_or(HomeCtrlError::Unauthorized)
    }
}
