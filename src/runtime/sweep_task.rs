//! Periodic sweep driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::Spawn;
use crate::runtime::service::QueueService;

/// Handle to a running sweep loop.
#[derive(Debug, Clone)]
pub struct SweepHandle {
    shutdown: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl SweepHandle {
    /// Ask the loop to exit. A cycle already in progress finishes first.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

/// Start sweeping `service` every `sweep_interval_secs` on `spawner`.
///
/// The first cycle runs one full interval after start.
pub fn start(service: Arc<QueueService>, spawner: &impl Spawn) -> SweepHandle {
    let handle = SweepHandle {
        shutdown: Arc::new(AtomicBool::new(false)),
        wake: Arc::new(Notify::new()),
    };
    let period = service.config().sweep_interval();
    let shutdown = Arc::clone(&handle.shutdown);
    let wake = Arc::clone(&handle.wake);

    spawner.spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await;
        info!(period_secs = period.as_secs(), "sweep loop started");

        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let report = service.sweep().await;
                    if report.is_empty() {
                        debug!("sweep cycle found nothing to do");
                    }
                }
                () = wake.notified() => {}
            }
        }
        info!("sweep loop stopped");
    });

    handle
}
