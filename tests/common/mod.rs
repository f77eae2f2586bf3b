#![allow(dead_code)]

use argon2::{Algorithm, Argon2, Params, Version};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode},
};
use home_ctrl::db::{self, ApiKeyStorage, EntryStorage, SessionStorage, SqlitePool};
use home_ctrl::service::{CredentialStore, KvStore, SessionManager};
use home_ctrl::{HomeCtrlState, home_ctrl_router};
use serde_json::Value;
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub struct TestDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub async fn temp_db(tag: &str) -> TestDb {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut path = std::env::temp_dir();
    path.push(format!(
        "home-ctrl-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", path.display());
    let pool = db::connect(&database_url).await.expect("failed to open db");
    db::init_schema(&pool).await.expect("failed to init schema");
    TestDb { pool, path }
}

/// Low-cost Argon2id so tests do not spend seconds hashing.
pub fn cheap_hasher() -> Argon2<'static> {
    let params = Params::new(1024, 1, 1, None).expect("valid argon2 params");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

pub fn credential_store(db: &TestDb) -> Arc<CredentialStore> {
    Arc::new(
        CredentialStore::with_hasher(ApiKeyStorage::new(db.pool.clone()), cheap_hasher())
            .expect("credential store"),
    )
}

pub fn session_manager(db: &TestDb, ttl: chrono::Duration) -> SessionManager {
    SessionManager::new(SessionStorage::new(db.pool.clone()), ttl)
}

pub fn kv_store(db: &TestDb) -> KvStore {
    KvStore::new(EntryStorage::new(db.pool.clone()))
}

pub async fn test_state(db: &TestDb, users: &[(&str, &str)]) -> HomeCtrlState {
    let credentials = credential_store(db);
    for (username, password) in users {
        credentials
            .add_user(username, password)
            .await
            .expect("failed to add user");
    }
    HomeCtrlState::new(
        credentials,
        session_manager(db, chrono::Duration::hours(24)),
        kv_store(db),
    )
}

pub fn test_app(state: HomeCtrlState) -> Router {
    home_ctrl_router(state)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let body = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body was not json")
}

pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    ApiKey(&'a str),
}

pub fn request(method: &str, uri: &str, auth: Auth<'_>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    builder = match auth {
        Auth::None => builder,
        Auth::Bearer(token) => builder.header("authorization", format!("Bearer {token}")),
        Auth::ApiKey(key) => builder.header("x-api-key", key),
    };
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request")
}

pub async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let resp = send(
        app,
        request(
            "POST",
            "/api/v1/auth/login",
            Auth::None,
            Some(serde_json::json!({ "username": username, "password": password })),
        ),
    )
    .await;
    let status = resp.status();
    (status, body_json(resp).await)
}
