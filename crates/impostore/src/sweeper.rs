//! Background deletion of abandoned rooms.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use impostore_pulse::{PulseConfig, PulseScheduler};
use impostore_session::RoomCoordinator;
use impostore_store::RoomStore;
use tokio::task::JoinHandle;

/// Handle to a running sweeper. Dropping it stops the sweeper.
pub struct SweeperHandle {
    task: JoinHandle<()>,
    swept: Arc<AtomicU64>,
}

impl SweeperHandle {
    /// Rooms deleted since the sweeper started.
    pub fn total_swept(&self) -> u64 {
        self.swept.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Runs [`RoomCoordinator::sweep_abandoned`] every `sweep_interval`,
/// deleting rooms whose heartbeat is older than `abandon_after`.
///
/// A failed sweep is logged and retried on the next pulse.
pub fn spawn_sweeper<S: RoomStore>(
    coordinator: Arc<RoomCoordinator<S>>,
    config: PulseConfig,
) -> SweeperHandle {
    let config = config.validated();
    let swept = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&swept);
    let mut scheduler = PulseScheduler::sweep(&config);

    tracing::info!(
        interval_ms = config.sweep_interval.as_millis() as u64,
        abandon_after_ms = config.abandon_after.as_millis() as u64,
        "sweeper started"
    );
    let task = tokio::spawn(async move {
        loop {
            scheduler.wait_for_pulse().await;
            match coordinator.sweep_abandoned(config.abandon_after).await {
                Ok(codes) if !codes.is_empty() => {
                    counter.fetch_add(codes.len() as u64, Ordering::Relaxed);
                    tracing::info!(rooms = codes.len(), "sweep removed abandoned rooms");
                }
                Ok(_) => tracing::trace!("sweep found nothing"),
                Err(e) => tracing::warn!(error = %e, "sweep failed"),
            }
        }
    });

    SweeperHandle { task, swept }
}
