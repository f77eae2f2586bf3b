use crate::db::models::ApiKey;
use crate::db::sqlite::{SqlitePool, decode_ts, encode_ts, is_unique_violation};
use crate::error::HomeCtrlError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

#[derive(Clone)]
pub struct ApiKeyStorage {
    pool: SqlitePool,
}

impl ApiKeyStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        key: &str,
        name: &str,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ApiKey, HomeCtrlError> {
        let row = sqlx::query(
            r#"INSERT INTO api_keys (key, name, created_at, expires_at)
               VALUES (?, ?, ?, ?)
               RETURNING id, key, name, created_at, expires_at"#,
        )
        .bind(key)
        .bind(name)
        .bind(encode_ts(created_at))
        .bind(expires_at.map(encode_ts))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HomeCtrlError::Conflict("API key already exists".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(Self::row_to_model(row)?)
    }

    pub async fn get_by_key(&self, key: &str) -> Result<Option<ApiKey>, HomeCtrlError> {
        let row = sqlx::query(
            "SELECT id, key, name, created_at, expires_at FROM api_keys WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    pub async fn list(&self) -> Result<Vec<ApiKey>, HomeCtrlError> {
        let rows = sqlx::query(
            "SELECT id, key, name, created_at, expires_at FROM api_keys ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(Self::row_to_model)
            .collect::<Result<_, _>>()?)
    }

    pub async fn count(&self) -> Result<i64, HomeCtrlError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Returns whether a row was removed.
    pub async fn delete_by_key(&self, key: &str) -> Result<bool, HomeCtrlError> {
        let res = sqlx::query("DELETE FROM api_keys WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    fn row_to_model(row: SqliteRow) -> Result<ApiKey, sqlx::Error> {
        let created_at: String = row.try_get("created_at")?;
        let expires_at: Option<String> = row.try_get("expires_at")?;
        Ok(ApiKey {
            id: row.try_get("id")?,
            key: row.try_get("key")?,
            name: row.try_get("name")?,
            created_at: decode_ts(&created_at)?,
            expires_at: expires_at.as_deref().map(decode_ts).transpose()?,
        })
    }
}
