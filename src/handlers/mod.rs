pub mod api_keys;
pub mod auth;
pub mod keyvalue;
pub mod system;
