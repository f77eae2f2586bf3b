pub mod auth_gate;
pub mod credential_store;
pub mod kv_store;
pub mod session_manager;
pub mod token;

pub use auth_gate::{AuthGate, Authenticator, Principal};
pub use credential_store::CredentialStore;
pub use kv_store::KvStore;
pub use session_manager::SessionManager;
