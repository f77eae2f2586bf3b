use crate::db::{ApiKey, ApiKeyStorage};
use crate::error::HomeCtrlError;
use crate::service::token::generate_token;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub const BOOTSTRAP_KEY_NAME: &str = "Default API Key";

/// Username/password credentials (in memory, Argon2id hashes only) plus the
/// persisted API keys.
///
/// Owned by the application state; config reloads upsert users through
/// [`CredentialStore::add_user`] while requests keep reading concurrently.
pub struct CredentialStore {
    users: RwLock<HashMap<String, String>>,
    hasher: Argon2<'static>,
    /// Verified against for unknown usernames so a miss costs the same as a hit.
    dummy_hash: String,
    api_keys: ApiKeyStorage,
}

impl CredentialStore {
    pub fn new(api_keys: ApiKeyStorage) -> Result<Self, HomeCtrlError> {
        Self::with_hasher(api_keys, Argon2::default())
    }

    pub fn with_hasher(
        api_keys: ApiKeyStorage,
        hasher: Argon2<'static>,
    ) -> Result<Self, HomeCtrlError> {
        let dummy_hash = hash_password(&hasher, &generate_token())?;
        Ok(Self {
            users: RwLock::new(HashMap::new()),
            hasher,
            dummy_hash,
            api_keys,
        })
    }

    /// Upsert a credential; last write wins. Hashing runs on the blocking pool
    /// and the map is only locked for the insert.
    pub async fn add_user(&self, username: &str, password: &str) -> Result<(), HomeCtrlError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let phc = tokio::task::spawn_blocking(move || hash_password(&hasher, &password)).await??;
        let replaced = self.users.write().insert(username.to_string(), phc).is_some();
        debug!(username, replaced, "credential stored");
        Ok(())
    }

    pub async fn add_users<'a, I>(&self, users: I) -> Result<usize, HomeCtrlError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut count = 0;
        for (username, password) in users {
            self.add_user(username, password).await?;
            count += 1;
        }
        Ok(count)
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }

    /// Check a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        let stored = self.users.read().get(username).cloned();
        let known = stored.is_some();
        let phc = stored.unwrap_or_else(|| self.dummy_hash.clone());
        let hasher = self.hasher.clone();
        let password = password.to_string();

        let matched = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&phc)
                .map(|parsed| hasher.verify_password(password.as_bytes(), &parsed).is_ok())
                .unwrap_or(false)
        })
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "password verification task failed");
            false
        });

        known && matched
    }

    pub async fn issue_api_key(
        &self,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ApiKey, HomeCtrlError> {
        let key = generate_token();
        let api_key = self
            .api_keys
            .insert(&key, name, Utc::now(), expires_at)
            .await?;
        info!(id = api_key.id, name, expires_at = ?expires_at, "API key issued");
        Ok(api_key)
    }

    /// Present and not expired. Storage failures fail closed.
    pub async fn validate_api_key(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        match self.api_keys.get_by_key(key).await {
            Ok(Some(api_key)) => !api_key.is_expired_at(Utc::now()),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "API key lookup failed; rejecting");
                false
            }
        }
    }

    /// Delete by value; absent keys are not an error.
    pub async fn revoke_api_key(&self, key: &str) -> Result<(), HomeCtrlError> {
        let removed = self.api_keys.delete_by_key(key).await?;
        info!(removed, "API key revoke requested");
        Ok(())
    }

    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>, HomeCtrlError> {
        self.api_keys.list().await
    }

    /// Issue a random key when none exist yet, so a fresh install is reachable.
    pub async fn ensure_bootstrap_key(&self) -> Result<Option<ApiKey>, HomeCtrlError> {
        if self.api_keys.count().await? > 0 {
            return Ok(None);
        }
        let api_key = self.issue_api_key(BOOTSTRAP_KEY_NAME, None).await?;
        warn!(
            key = %api_key.key,
            "no API keys found; created bootstrap key (store it now, it is not shown again)"
        );
        Ok(Some(api_key))
    }
}

fn hash_password(hasher: &Argon2<'static>, password: &str) -> Result<String, HomeCtrlError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = hasher.hash_password(password.as_bytes(), &salt)?;
    Ok(phc.to_string())
}
