mod common;

use chrono::Duration;
use common::{session_manager, temp_db};
use home_ctrl::HomeCtrlError;

#[tokio::test]
async fn created_session_validates_to_its_username() {
    let db = temp_db("session-create").await;
    let sessions = session_manager(&db, Duration::hours(24));

    let session = sessions.create_session("alice").await.unwrap();
    assert_eq!(session.session_id.len(), 64);
    assert_eq!(session.expires_at - session.created_at, Duration::hours(24));
    assert_eq!(sessions.validate(&session.session_id).await.as_deref(), Some("alice"));
}

#[tokio::test]
async fn each_login_gets_a_distinct_token() {
    let db = temp_db("session-distinct").await;
    let sessions = session_manager(&db, Duration::hours(1));

    let a = sessions.create_session("alice").await.unwrap();
    let b = sessions.create_session("alice").await.unwrap();
    assert_ne!(a.session_id, b.session_id);
    assert!(sessions.validate(&a.session_id).await.is_some());
    assert!(sessions.validate(&b.session_id).await.is_some());
}

#[tokio::test]
async fn expiry_is_enforced_without_a_sweep() {
    let db = temp_db("session-expiry").await;
    let sessions = session_manager(&db, Duration::hours(1));

    let session = sessions
        .create_session_with_ttl("alice", Duration::milliseconds(50))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(120)).await;

    assert!(sessions.validate(&session.session_id).await.is_none());
}

#[tokio::test]
async fn validation_does_not_extend_expiry() {
    let db = temp_db("session-fixed").await;
    let sessions = session_manager(&db, Duration::hours(1));

    let session = sessions
        .create_session_with_ttl("alice", Duration::milliseconds(300))
        .await
        .unwrap();
    for _ in 0..3 {
        assert!(sessions.validate(&session.session_id).await.is_some());
        tokio::time::sleep(std::time::Duration::from_millis(40)).await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    assert!(sessions.validate(&session.session_id).await.is_none());
}

#[tokio::test]
async fn unknown_and_empty_tokens_are_rejected() {
    let db = temp_db("session-unknown").await;
    let sessions = session_manager(&db, Duration::hours(1));

    assert!(sessions.validate("").await.is_none());
    assert!(sessions.validate("deadbeef").await.is_none());
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let db = temp_db("session-revoke").await;
    let sessions = session_manager(&db, Duration::hours(1));
    let session = sessions.create_session("alice").await.unwrap();

    sessions.revoke(&session.session_id).await.unwrap();
    assert!(sessions.validate(&session.session_id).await.is_none());
    sessions.revoke(&session.session_id).await.unwrap();
    sessions.revoke("never-issued").await.unwrap();
}

#[tokio::test]
async fn sweep_removes_only_expired_sessions() {
    let db = temp_db("session-sweep").await;
    let sessions = session_manager(&db, Duration::hours(1));

    let live = sessions.create_session("alice").await.unwrap();
    sessions
        .create_session_with_ttl("bob", Duration::milliseconds(10))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(sessions.sweep_expired().await.unwrap(), 1);
    assert_eq!(sessions.sweep_expired().await.unwrap(), 0);
    assert_eq!(sessions.validate(&live.session_id).await.as_deref(), Some("alice"));
}

#[tokio::test]
async fn out_of_range_ttl_is_an_error_not_a_panic() {
    let db = temp_db("session-overflow").await;
    let sessions = session_manager(&db, Duration::hours(1));

    for ttl in [Duration::MAX, Duration::hours(3_000_000_000), Duration::zero(), Duration::hours(-1)] {
        let err = sessions.create_session_with_ttl("alice", ttl).await.unwrap_err();
        assert!(matches!(err, HomeCtrlError::Validation(_)), "ttl {ttl}");
    }

    let session = sessions.create_session("alice").await.unwrap();
    assert!(session.expires_at > session.created_at);
}
