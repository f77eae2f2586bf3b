use crate::db::schema::SQLITE_INIT;
use crate::error::HomeCtrlError;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Open the pool for `database_url`, creating the database file and its
/// parent directory when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, HomeCtrlError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    if let Some(parent) = connect_opts.get_filename().parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(connect_opts)
        .await?;
    info!(database_url, "sqlite pool connected");
    Ok(pool)
}

/// Initialize the schema by executing the bundled DDL.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), HomeCtrlError> {
    // execute multiple statements one by one (sqlx::query runs a single statement)
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}

/// Fixed-width RFC3339 (microseconds, `Z` suffix); lexical order == time order.
pub fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `ts` if it keeps the four-digit year that [`encode_ts`] ordering relies on.
pub fn storable_ts(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    (0..=9999).contains(&ts.year()).then_some(ts)
}

pub fn decode_ts(raw: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
