use crate::db::models::{Entry, EntryStatus};
use crate::db::sqlite::{SqlitePool, decode_ts, encode_ts, is_unique_violation};
use crate::error::HomeCtrlError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

const ENTRY_COLUMNS: &str = "id, key, value, status, is_hidden, created_at, updated_at";

/// Row-level access to `key_values`. Every mutation is one statement, so a
/// concurrent delete can never be resurrected by an in-flight update.
#[derive(Clone)]
pub struct EntryStorage {
    pool: SqlitePool,
}

impl EntryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Entry, HomeCtrlError> {
        let ts = encode_ts(now);
        let row = sqlx::query(&format!(
            r#"INSERT INTO key_values (key, value, status, is_hidden, created_at, updated_at)
               VALUES (?, ?, ?, 0, ?, ?)
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(key)
        .bind(value)
        .bind(EntryStatus::Unread.as_str())
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HomeCtrlError::Conflict(format!("key `{key}` already exists"))
            } else {
                e.into()
            }
        })?;
        Ok(Self::row_to_model(row)?)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Entry>, HomeCtrlError> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM key_values WHERE key = ?"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    // `MAX(created_at, ?)` keeps updated_at >= created_at even if the wall clock steps back.
    pub async fn update_value(
        &self,
        key: &str,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, HomeCtrlError> {
        let row = sqlx::query(&format!(
            r#"UPDATE key_values SET value = ?, updated_at = MAX(created_at, ?)
               WHERE key = ?
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(value)
        .bind(encode_ts(now))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    pub async fn update_status(
        &self,
        key: &str,
        status: EntryStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, HomeCtrlError> {
        let row = sqlx::query(&format!(
            r#"UPDATE key_values SET status = ?, updated_at = MAX(created_at, ?)
               WHERE key = ?
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(status.as_str())
        .bind(encode_ts(now))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    pub async fn update_hidden(
        &self,
        key: &str,
        hidden: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Entry>, HomeCtrlError> {
        let row = sqlx::query(&format!(
            r#"UPDATE key_values SET is_hidden = ?, updated_at = MAX(created_at, ?)
               WHERE key = ?
               RETURNING {ENTRY_COLUMNS}"#
        ))
        .bind(hidden)
        .bind(encode_ts(now))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    pub async fn delete(&self, key: &str) -> Result<bool, HomeCtrlError> {
        let res = sqlx::query("DELETE FROM key_values WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Newest first; hidden rows are filtered in SQL, never redacted.
    pub async fn list(&self, include_hidden: bool) -> Result<Vec<Entry>, HomeCtrlError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ENTRY_COLUMNS} FROM key_values
               WHERE (? OR is_hidden = 0)
               ORDER BY created_at DESC, id DESC"#
        ))
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(Self::row_to_model)
            .collect::<Result<_, _>>()?)
    }

    pub async fn status_of(&self, key: &str) -> Result<Option<EntryStatus>, HomeCtrlError> {
        let rec: Option<(String,)> = sqlx::query_as("SELECT status FROM key_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        match rec {
            Some((raw,)) => Ok(Some(Self::decode_status(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn exists(&self, key: &str) -> Result<bool, HomeCtrlError> {
        let rec: (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM key_values WHERE key = ?)")
                .bind(key)
                .fetch_one(&self.pool)
                .await?;
        Ok(rec.0 != 0)
    }

    /// Delete archived rows last touched before `cutoff`.
    pub async fn delete_archived_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, HomeCtrlError> {
        let res = sqlx::query("DELETE FROM key_values WHERE status = ? AND updated_at < ?")
            .bind(EntryStatus::Archived.as_str())
            .bind(encode_ts(cutoff))
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    fn decode_status(raw: &str) -> Result<EntryStatus, sqlx::Error> {
        raw.parse::<EntryStatus>()
            .map_err(|_| sqlx::Error::Decode(format!("unknown entry status `{raw}`").into()))
    }

    fn row_to_model(row: SqliteRow) -> Result<Entry, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let is_hidden: i64 = row.try_get("is_hidden")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        Ok(Entry {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            status: Self::decode_status(&status)?,
            is_hidden: is_hidden != 0,
            created_at: decode_ts(&created_at)?,
            updated_at: decode_ts(&updated_at)?,
        })
    }
}
