use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::service::UnlockService;

/// Background driver for the unlock engine.
///
/// Holds exactly one recurring task. The task runs a sweep per tick with
/// skipped (not queued) ticks when a sweep overruns the period, so two
/// sweeps can never be in flight at once. Clock jumps in either direction
/// are harmless: every decision compares absolute unlock instants, never
/// elapsed-since-last-tick arithmetic.
pub struct UnlockWorker {
    service: Arc<UnlockService>,
    period: Duration,
    handle: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl UnlockWorker {
    pub fn new(service: Arc<UnlockService>, check_interval_secs: u64) -> Self {
        Self {
            service,
            period: Duration::from_secs(check_interval_secs),
            handle: None,
            shutdown: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the recurring sweep task. Idempotent: a second call logs a
    /// warning and changes nothing.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("unlock worker is already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let service = Arc::clone(&self.service);
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of `interval` fires immediately; consume it so
            // the first sweep happens one full period after start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = service.sweep().await {
                            error!(error = %e, "unlock sweep failed");
                        }
                    }
                }
            }
        });

        self.handle = Some(handle);
        self.shutdown = Some(shutdown_tx);
        info!(period_secs = period.as_secs(), "unlock worker started");
    }

    /// Stop the worker, waiting for an in-flight sweep to finish first.
    /// Idempotent: stopping a stopped worker is a no-op.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Err(e) = handle.await {
            error!(error = %e, "unlock worker task panicked");
        }
        info!("unlock worker stopped");
    }
}
