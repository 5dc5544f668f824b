//! Background Expiry Sweeper
//!
//! Lazy expiry (checking on access) has a gap: a key that expires and is
//! never read again stays in memory forever. The sweeper closes it by
//! periodically scanning the deadline map and removing every key whose
//! deadline has passed — the "active" half of the expiration design.
//!
//! ## Lifecycle
//!
//! The sweeper is an owned background task, not process-global state.
//! [`Sweeper::start`] spawns it and returns a handle; [`Sweeper::shutdown`]
//! signals it and JOINS the task, which orderly shutdown does before the
//! append-only log is flushed and closed — after the join, no sweep can
//! still be writing `DEL` records. Dropping the handle also signals stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::storage::Store;

/// How often the sweeper scans the deadline map.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// A handle to the running expiry sweeper.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Starts the sweeper as a background task.
    ///
    /// `interval` is [`SWEEP_INTERVAL`] in production; tests pass something
    /// shorter.
    pub fn start(store: Arc<Store>, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sweep_loop(store, interval, shutdown_rx));

        info!(interval_ms = interval.as_millis() as u64, "expiry sweeper started");

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Signals the sweeper to stop and waits for the task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("expiry sweeper stopped");
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// The main sweeper loop.
async fn sweep_loop(store: Arc<Store>, interval: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let removed = store.sweep_expired();
        if removed > 0 {
            debug!(
                removed,
                keys_remaining = store.len(),
                "expired keys swept"
            );
        }
    }
}

/// Starts the sweeper at the production interval.
pub fn start_sweeper(store: Arc<Store>) -> Sweeper {
    Sweeper::start(store, SWEEP_INTERVAL)
}
