//! SQL DDL for initializing the home-ctrl storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `api_keys.key`, `sessions.session_id`, `key_values.key` UNIQUE (the
///   persistence layer owns uniqueness; duplicate inserts fail)
/// - Timestamps as fixed-width RFC3339 UTC text, so `<` compares chronologically
/// - `is_hidden` BOOLEAN (stored as INTEGER 0/1)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    expires_at TEXT NULL -- RFC3339, NULL = never expires
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    expires_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

CREATE TABLE IF NOT EXISTS key_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL UNIQUE,
    value TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'unread' CHECK (status IN ('unread', 'read', 'archived')),
    is_hidden INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_key_values_created_at ON key_values(created_at);
CREATE INDEX IF NOT EXISTS idx_key_values_status_updated_at ON key_values(status, updated_at);
"#;
