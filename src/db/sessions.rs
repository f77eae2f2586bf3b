use crate::db::models::Session;
use crate::db::sqlite::{SqlitePool, decode_ts, encode_ts, is_unique_violation};
use crate::error::HomeCtrlError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

#[derive(Clone)]
pub struct SessionStorage {
    pool: SqlitePool,
}

impl SessionStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        session_id: &str,
        username: &str,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Session, HomeCtrlError> {
        let row = sqlx::query(
            r#"INSERT INTO sessions (session_id, username, created_at, expires_at)
               VALUES (?, ?, ?, ?)
               RETURNING id, session_id, username, created_at, expires_at"#,
        )
        .bind(session_id)
        .bind(username)
        .bind(encode_ts(created_at))
        .bind(encode_ts(expires_at))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                HomeCtrlError::Conflict("session token already exists".to_string())
            } else {
                e.into()
            }
        })?;
        Ok(Self::row_to_model(row)?)
    }

    pub async fn get_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<Option<Session>, HomeCtrlError> {
        let row = sqlx::query(
            r#"SELECT id, session_id, username, created_at, expires_at
               FROM sessions WHERE session_id = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Self::row_to_model).transpose()?)
    }

    pub async fn delete_by_session_id(&self, session_id: &str) -> Result<bool, HomeCtrlError> {
        let res = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Bulk delete every row whose `expires_at` lies before `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, HomeCtrlError> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(encode_ts(now))
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    fn row_to_model(row: SqliteRow) -> Result<Session, sqlx::Error> {
        let created_at: String = row.try_get("created_at")?;
        let expires_at: String = row.try_get("expires_at")?;
        Ok(Session {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            username: row.try_get("username")?,
            created_at: decode_ts(&created_at)?,
            expires_at: decode_ts(&expires_at)?,
        })
    }
}
