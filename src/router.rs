use crate::handlers::{api_keys, auth, keyvalue, system};
use crate::middleware::auth::require_auth;
use crate::service::{AuthGate, CredentialStore, KvStore, SessionManager};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;

const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct HomeCtrlState {
    pub credentials: Arc<CredentialStore>,
    pub sessions: SessionManager,
    pub entries: KvStore,
    pub gate: Arc<AuthGate>,
}

impl HomeCtrlState {
    pub fn new(credentials: Arc<CredentialStore>, sessions: SessionManager, entries: KvStore) -> Self {
        let gate = Arc::new(AuthGate::standard(credentials.clone(), sessions.clone()));
        Self {
            credentials,
            sessions,
            entries,
            gate,
        }
    }
}

pub fn home_ctrl_router(state: HomeCtrlState) -> Router {
    let public = Router::new()
        .route("/health", get(system::health))
        .route("/version", get(system::version))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    let protected = Router::new()
        .route("/me", get(auth::me))
        .route("/keyvalue", post(keyvalue::create).get(keyvalue::list))
        .route(
            "/keyvalue/{key}",
            get(keyvalue::get_entry)
                .put(keyvalue::update)
                .delete(keyvalue::delete_entry),
        )
        .route(
            "/keyvalue/{key}/status",
            get(keyvalue::check_status).patch(keyvalue::set_status),
        )
        .route("/keyvalue/{key}/hidden", patch(keyvalue::set_hidden))
        .route("/keyvalue/{key}/exists", get(keyvalue::check_exists))
        .route("/apikeys", post(api_keys::issue).get(api_keys::list))
        .route("/apikeys/{key}", delete(api_keys::revoke))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(system::health))
        .nest("/api/v1", public.merge(protected))
        .fallback(system::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
