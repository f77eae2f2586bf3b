use crate::config::Config;
use crate::db::{self, ApiKeyStorage, EntryStorage, SessionStorage, SqlitePool};
use crate::error::HomeCtrlError;
use crate::jobs::maintenance;
use crate::router::{HomeCtrlState, home_ctrl_router};
use crate::service::{CredentialStore, KvStore, SessionManager};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Open the database and create the schema.
pub async fn open_database(cfg: &Config) -> Result<SqlitePool, HomeCtrlError> {
    let pool = db::connect(&cfg.database_url).await?;
    db::init_schema(&pool).await?;
    Ok(pool)
}

/// Wire storages and services over `pool`, seeding users from `cfg`.
pub async fn build_state(cfg: &Config, pool: SqlitePool) -> Result<HomeCtrlState, HomeCtrlError> {
    let credentials = Arc::new(CredentialStore::new(ApiKeyStorage::new(pool.clone()))?);
    let seeded = credentials.add_users(&cfg.auth.users).await?;
    if seeded == 0 {
        warn!("no users configured; only API keys can authenticate");
    } else {
        info!(count = seeded, "users loaded from config");
    }

    if cfg.auth.bootstrap_api_key {
        credentials.ensure_bootstrap_key().await?;
    }

    let sessions = SessionManager::new(SessionStorage::new(pool.clone()), cfg.session_ttl()?);
    let entries = KvStore::new(EntryStorage::new(pool));
    Ok(HomeCtrlState::new(credentials, sessions, entries))
}

/// Create the schema (and bootstrap key) and return.
pub async fn migrate(cfg: &Config) -> Result<(), HomeCtrlError> {
    let pool = open_database(cfg).await?;
    if cfg.auth.bootstrap_api_key {
        let credentials = CredentialStore::new(ApiKeyStorage::new(pool.clone()))?;
        credentials.ensure_bootstrap_key().await?;
    }
    pool.close().await;
    info!(database_url = %cfg.database_url, "database migrations completed");
    Ok(())
}

/// Serve until SIGINT/SIGTERM. SIGHUP re-reads `config_path` and upserts its users.
pub async fn serve(cfg: Config, config_path: PathBuf) -> Result<(), HomeCtrlError> {
    let pool = open_database(&cfg).await?;
    let state = build_state(&cfg, pool.clone()).await?;

    let maintenance = maintenance::spawn(
        state.sessions.clone(),
        state.entries.clone(),
        cfg.maintenance_interval(),
        cfg.archived_retention()?,
    );
    let reload = spawn_reload_listener(state.credentials.clone(), config_path);

    let app = home_ctrl_router(state);
    let addr = cfg.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    maintenance.abort();
    if let Some(reload) = reload {
        reload.abort();
    }
    pool.close().await;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down gracefully"),
        _ = terminate => info!("received SIGTERM, shutting down gracefully"),
    }
}

#[cfg(unix)]
fn spawn_reload_listener(
    credentials: Arc<CredentialStore>,
    config_path: PathBuf,
) -> Option<tokio::task::JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGHUP; config reload disabled");
            return None;
        }
    };

    Some(tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            info!(path = %config_path.display(), "received SIGHUP, reloading configuration");
            if let Err(e) = reload_users(&credentials, &config_path).await {
                warn!(error = %e, "failed to reload config");
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_reload_listener(
    _credentials: Arc<CredentialStore>,
    _config_path: PathBuf,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}

/// Upsert the users of the config at `path`; users are never removed.
pub async fn reload_users(
    credentials: &CredentialStore,
    path: &std::path::Path,
) -> Result<usize, HomeCtrlError> {
    let cfg = Config::load(path)?;
    let count = credentials.add_users(&cfg.auth.users).await?;
    info!(count, total = credentials.user_count(), "configuration reloaded");
    Ok(count)
}
