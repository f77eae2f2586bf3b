//! Database module: models, schema and per-table storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: pool setup and timestamp encoding shared by the storages
//! - `api_keys.rs`, `sessions.rs`, `entries.rs`: one storage per table

pub mod api_keys;
pub mod entries;
pub mod models;
pub mod schema;
pub mod sessions;
pub mod sqlite;

pub use api_keys::ApiKeyStorage;
pub use entries::EntryStorage;
pub use models::{ApiKey, Entry, EntryStatus, Session};
pub use schema::SQLITE_INIT;
pub use sessions::SessionStorage;
pub use sqlite::{SqlitePool, connect, init_schema};
