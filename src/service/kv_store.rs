use crate::db::sqlite::storable_ts;
use crate::db::{Entry, EntryStatus, EntryStorage};
use crate::error::HomeCtrlError;
use chrono::{Duration, Utc};
use tracing::{debug, info};

/// Key-value entries with independent `status` and `is_hidden` axes.
///
/// Any status may move to any other; nothing transitions on its own. Archiving
/// is the only signal [`KvStore::cleanup`] acts on.
#[derive(Clone)]
pub struct KvStore {
    storage: EntryStorage,
}

impl KvStore {
    pub fn new(storage: EntryStorage) -> Self {
        Self { storage }
    }

    pub async fn create(&self, key: &str, value: &str) -> Result<Entry, HomeCtrlError> {
        let entry = self.storage.insert(key, value, Utc::now()).await?;
        debug!(key, id = entry.id, "entry created");
        Ok(entry)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Entry>, HomeCtrlError> {
        self.storage.get(key).await
    }

    pub async fn update(&self, key: &str, value: &str) -> Result<Entry, HomeCtrlError> {
        self.storage
            .update_value(key, value, Utc::now())
            .await?
            .ok_or_else(|| not_found(key))
    }

    pub async fn set_status(&self, key: &str, status: EntryStatus) -> Result<Entry, HomeCtrlError> {
        let entry = self
            .storage
            .update_status(key, status, Utc::now())
            .await?
            .ok_or_else(|| not_found(key))?;
        debug!(key, %status, "entry status changed");
        Ok(entry)
    }

    pub async fn set_hidden(&self, key: &str, hidden: bool) -> Result<Entry, HomeCtrlError> {
        self.storage
            .update_hidden(key, hidden, Utc::now())
            .await?
            .ok_or_else(|| not_found(key))
    }

    /// Absent keys are a no-op.
    pub async fn delete(&self, key: &str) -> Result<(), HomeCtrlError> {
        let removed = self.storage.delete(key).await?;
        debug!(key, removed, "entry delete requested");
        Ok(())
    }

    pub async fn list(&self, include_hidden: bool) -> Result<Vec<Entry>, HomeCtrlError> {
        self.storage.list(include_hidden).await
    }

    pub async fn check_status(&self, key: &str) -> Result<Option<EntryStatus>, HomeCtrlError> {
        self.storage.status_of(key).await
    }

    pub async fn check_exists(&self, key: &str) -> Result<bool, HomeCtrlError> {
        self.storage.exists(key).await
    }

    /// Delete archived entries not updated within `older_than`. Unread and
    /// read entries survive regardless of age.
    pub async fn cleanup(&self, older_than: Duration) -> Result<u64, HomeCtrlError> {
        let cutoff = Utc::now()
            .checked_sub_signed(older_than)
            .and_then(storable_ts)
            .ok_or_else(|| {
                HomeCtrlError::Validation(format!("cleanup age {older_than} is out of range"))
            })?;
        let removed = self.storage.delete_archived_before(cutoff).await?;
        if removed > 0 {
            info!(removed, cutoff = %cutoff, "archived entries cleaned up");
        }
        Ok(removed)
    }
}

fn not_found(key: &str) -> HomeCtrlError {
    HomeCtrlError::NotFound(format!("key `{key}` not found"))
}
