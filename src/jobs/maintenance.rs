//! Background job: reclaim storage held by expired sessions and old archived
//! entries.
//!
//! Correctness never depends on this job; sessions expire at read time and
//! archived entries are simply kept longer if it does not run.

use crate::service::{KvStore, SessionManager};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error};

/// Spawn the periodic maintenance task. Call this once at startup.
pub fn spawn(
    sessions: SessionManager,
    entries: KvStore,
    every: Duration,
    archived_retention: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            run_once(&sessions, &entries, archived_retention).await;
        }
    })
}

/// One maintenance pass; failures are logged and the next pass retries.
pub async fn run_once(
    sessions: &SessionManager,
    entries: &KvStore,
    archived_retention: chrono::Duration,
) {
    debug!("maintenance pass starting");
    if let Err(e) = sessions.sweep_expired().await {
        error!("session sweep failed: {}", e);
    }
    if let Err(e) = entries.cleanup(archived_retention).await {
        error!("archived entry cleanup failed: {}", e);
    }
}
