use crate::db::sqlite::storable_ts;
use crate::db::{Session, SessionStorage};
use crate::error::HomeCtrlError;
use crate::service::token::generate_token;
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

/// Issues and checks bearer sessions with a fixed absolute lifetime.
///
/// Expiry is decided when a token is read, never by eviction: a session is
/// active iff `now < expires_at`, whether or not [`SessionManager::sweep_expired`]
/// has ever run.
#[derive(Clone)]
pub struct SessionManager {
    storage: SessionStorage,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(storage: SessionStorage, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create_session(&self, username: &str) -> Result<Session, HomeCtrlError> {
        self.create_session_with_ttl(username, self.ttl).await
    }

    pub async fn create_session_with_ttl(
        &self,
        username: &str,
        ttl: Duration,
    ) -> Result<Session, HomeCtrlError> {
        if ttl <= Duration::zero() {
            return Err(HomeCtrlError::Validation(
                "session ttl must be positive".to_string(),
            ));
        }
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .and_then(storable_ts)
            .ok_or_else(|| HomeCtrlError::Validation(format!("session ttl {ttl} is out of range")))?;
        let session = self
            .storage
            .insert(&generate_token(), username, now, expires_at)
            .await?;
        info!(username, expires_at = %session.expires_at, "session created");
        Ok(session)
    }

    /// Returns the session's username, or `None` for empty, unknown or
    /// expired tokens. Never extends the expiry.
    pub async fn validate(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            return None;
        }
        match self.storage.get_by_session_id(token).await {
            Ok(Some(session)) if session.is_active_at(Utc::now()) => Some(session.username),
            Ok(Some(session)) => {
                debug!(username = %session.username, "rejecting expired session");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "session lookup failed; rejecting");
                None
            }
        }
    }

    /// Delete the session; unknown tokens are a no-op.
    pub async fn revoke(&self, token: &str) -> Result<(), HomeCtrlError> {
        let removed = self.storage.delete_by_session_id(token).await?;
        debug!(removed, "session revoke requested");
        Ok(())
    }

    /// Reclaim storage held by expired sessions.
    pub async fn sweep_expired(&self) -> Result<u64, HomeCtrlError> {
        let removed = self.storage.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "expired sessions swept");
        }
        Ok(removed)
    }
}
