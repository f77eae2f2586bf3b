use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::HomeCtrlError;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const ENV_PREFIX: &str = "HOME_CTRL_";

/// Upper bound for hour-valued settings (100 years).
pub const MAX_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub maintenance: MaintenanceConfig,
    pub database_url: String,
    pub loglevel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// username -> plaintext password; hashed when loaded into the credential store.
    pub users: HashMap<String, String>,
    pub session_ttl_hours: u64,
    /// Issue a random API key on startup when none exist yet.
    pub bootstrap_api_key: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MaintenanceConfig {
    pub interval_secs: u64,
    pub archived_retention_hours: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            maintenance: MaintenanceConfig::default(),
            database_url: "sqlite:data/home-ctrl.db".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            session_ttl_hours: 24,
            bootstrap_api_key: true,
        }
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            archived_retention_hours: 24 * 7,
        }
    }
}

impl Config {
    /// Layer defaults, the YAML file at `path` (if present) and `HOME_CTRL_*` env vars.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HomeCtrlError> {
        let cfg: Self = Self::figment(path).extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject hour values that cannot be turned into a usable duration.
    pub fn validate(&self) -> Result<(), HomeCtrlError> {
        if self.auth.session_ttl_hours == 0 {
            return Err(HomeCtrlError::Validation(
                "auth.session_ttl_hours must be at least 1".to_string(),
            ));
        }
        self.session_ttl()?;
        self.archived_retention()?;
        Ok(())
    }

    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn session_ttl(&self) -> Result<chrono::Duration, HomeCtrlError> {
        hours("auth.session_ttl_hours", self.auth.session_ttl_hours)
    }

    pub fn archived_retention(&self) -> Result<chrono::Duration, HomeCtrlError> {
        hours(
            "maintenance.archived_retention_hours",
            self.maintenance.archived_retention_hours,
        )
    }

    pub fn maintenance_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.maintenance.interval_secs.max(1))
    }
}

fn hours(field: &str, value: u64) -> Result<chrono::Duration, HomeCtrlError> {
    i64::try_from(value)
        .ok()
        .filter(|h| *h <= MAX_HOURS)
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| {
            HomeCtrlError::Validation(format!("{field} must be at most {MAX_HOURS}, got {value}"))
        })
}
