mod common;

use chrono::Duration;
use common::{credential_store, kv_store, session_manager, temp_db};
use home_ctrl::HomeCtrlError;
use home_ctrl::app::{build_state, reload_users};
use home_ctrl::config::Config;
use home_ctrl::db::EntryStatus;
use home_ctrl::jobs::maintenance;
use std::fs;

#[tokio::test]
async fn build_state_seeds_users_and_bootstrap_key() {
    let db = temp_db("app-build").await;
    let mut cfg = Config::default();
    cfg.auth
        .users
        .insert("admin".to_string(), "admin123".to_string());

    let state = build_state(&cfg, db.pool.clone()).await.unwrap();
    assert_eq!(state.credentials.user_count(), 1);
    assert!(state.credentials.verify("admin", "admin123").await);
    assert_eq!(state.credentials.list_api_keys().await.unwrap().len(), 1);
    assert_eq!(state.sessions.ttl(), Duration::hours(24));

    // a second start reuses the existing key
    build_state(&cfg, db.pool.clone()).await.unwrap();
    assert_eq!(state.credentials.list_api_keys().await.unwrap().len(), 1);
}

#[tokio::test]
async fn build_state_without_bootstrap_issues_no_key() {
    let db = temp_db("app-no-bootstrap").await;
    let mut cfg = Config::default();
    cfg.auth.bootstrap_api_key = false;

    let state = build_state(&cfg, db.pool.clone()).await.unwrap();
    assert_eq!(state.credentials.user_count(), 0);
    assert!(state.credentials.list_api_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn build_state_rejects_an_unusable_session_ttl() {
    let db = temp_db("app-bad-ttl").await;
    let mut cfg = Config::default();
    cfg.auth.session_ttl_hours = u64::MAX;

    let err = build_state(&cfg, db.pool.clone()).await.err().expect("ttl rejected");
    assert!(matches!(err, HomeCtrlError::Validation(_)));
}

#[tokio::test]
async fn reload_upserts_users_from_the_config_file() {
    let db = temp_db("app-reload").await;
    let creds = credential_store(&db);
    creds.add_user("admin", "old").await.unwrap();
    creds.add_user("keeper", "stay").await.unwrap();

    let path = std::env::temp_dir().join(format!("home-ctrl-reload-{}.yaml", std::process::id()));
    fs::write(
        &path,
        "auth:\n  users:\n    admin: new\n    guest: guest\n",
    )
    .unwrap();

    let count = reload_users(&creds, &path).await.unwrap();
    let _ = fs::remove_file(&path);

    assert_eq!(count, 2);
    assert_eq!(creds.user_count(), 3);
    assert!(creds.verify("admin", "new").await);
    assert!(!creds.verify("admin", "old").await);
    assert!(creds.verify("guest", "guest").await);
    assert!(creds.verify("keeper", "stay").await);
}

#[tokio::test]
async fn maintenance_pass_sweeps_sessions_and_archived_entries() {
    let db = temp_db("app-maintenance").await;
    let sessions = session_manager(&db, Duration::hours(1));
    let entries = kv_store(&db);

    let live = sessions.create_session("alice").await.unwrap();
    sessions
        .create_session_with_ttl("bob", Duration::milliseconds(10))
        .await
        .unwrap();
    entries.create("done", "x").await.unwrap();
    entries.set_status("done", EntryStatus::Archived).await.unwrap();
    entries.create("todo", "y").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    maintenance::run_once(&sessions, &entries, Duration::zero()).await;

    assert_eq!(sessions.sweep_expired().await.unwrap(), 0);
    assert!(sessions.validate(&live.session_id).await.is_some());
    assert!(!entries.check_exists("done").await.unwrap());
    assert!(entries.check_exists("todo").await.unwrap());
}
