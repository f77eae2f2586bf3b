use crate::service::credential_store::CredentialStore;
use crate::service::session_manager::SessionManager;
use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use headers::authorization::Bearer;
use headers::{Authorization, Header, HeaderMapExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Who an admitted request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Admitted by API key; no identity attached.
    ApiKey,
    Session { username: String },
}

impl Principal {
    pub fn username(&self) -> Option<&str> {
        match self {
            Principal::ApiKey => None,
            Principal::Session { username } => Some(username),
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Principal::ApiKey => AuthMethod::ApiKey,
            Principal::Session { .. } => AuthMethod::Session,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    Session,
}

/// One way of admitting a request. Strategies only read; they never create
/// or touch sessions.
#[async_trait]
pub trait Authenticator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// `X-API-Key: <key>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XApiKey(pub String);

impl Header for XApiKey {
    fn name() -> &'static HeaderName {
        &X_API_KEY
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let key = value
            .to_str()
            .map_err(|_| headers::Error::invalid())?
            .trim();
        if key.is_empty() {
            return Err(headers::Error::invalid());
        }
        Ok(XApiKey(key.to_string()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}

pub struct ApiKeyAuthenticator {
    credentials: Arc<CredentialStore>,
}

impl ApiKeyAuthenticator {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    fn name(&self) -> &'static str {
        "api_key"
    }

    async fn attempt(&self, headers: &HeaderMap) -> Option<Principal> {
        let XApiKey(key) = headers.typed_get::<XApiKey>()?;
        self.credentials
            .validate_api_key(&key)
            .await
            .then_some(Principal::ApiKey)
    }
}

pub struct SessionAuthenticator {
    sessions: SessionManager,
}

impl SessionAuthenticator {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn attempt(&self, headers: &HeaderMap) -> Option<Principal> {
        let bearer = bearer_token(headers)?;
        let username = self.sessions.validate(&bearer).await?;
        Some(Principal::Session { username })
    }
}

/// Token from `Authorization: Bearer <token>`; `None` when absent or malformed.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Evaluates authenticators in fixed precedence until one admits.
#[derive(Clone)]
pub struct AuthGate {
    strategies: Vec<Arc<dyn Authenticator>>,
}

impl AuthGate {
    pub fn new(strategies: Vec<Arc<dyn Authenticator>>) -> Self {
        Self { strategies }
    }

    /// API key first, then bearer session.
    pub fn standard(credentials: Arc<CredentialStore>, sessions: SessionManager) -> Self {
        Self::new(vec![
            Arc::new(ApiKeyAuthenticator::new(credentials)),
            Arc::new(SessionAuthenticator::new(sessions)),
        ])
    }

    pub async fn evaluate(&self, headers: &HeaderMap) -> Option<Principal> {
        for strategy in &self.strategies {
            if let Some(principal) = strategy.attempt(headers).await {
                debug!(strategy = strategy.name(), "request admitted");
                return Some(principal);
            }
        }
        debug!("request rejected by every authenticator");
        None
    }
}
