//! The host's side of a room.

use std::sync::Arc;

use impostore_protocol::{ParticipantId, RoomCode};
use impostore_pulse::{PulseConfig, PulseScheduler};
use impostore_session::{RoomCoordinator, SessionError, SettingsUpdate};
use impostore_store::{RoomStore, Subscription};
use tokio::task::JoinHandle;

use crate::{HostConfig, ImpostoreError, join_link};

/// A room opened by a host.
///
/// While the session is alive a background task stamps the room's
/// heartbeat every `pulse.heartbeat_interval`, which keeps the sweeper
/// away. Dropping the session stops the heartbeat and deletes the room,
/// so a host that navigates away never leaves a room behind. Use
/// [`close`](Self::close) to delete it and wait for the result.
pub struct HostSession<S: RoomStore> {
    coordinator: Arc<RoomCoordinator<S>>,
    code: RoomCode,
    host_id: ParticipantId,
    join_link: String,
    heartbeat: Option<JoinHandle<()>>,
}

impl<S: RoomStore> HostSession<S> {
    /// Creates a room with a fresh host id and starts its heartbeat.
    pub async fn open(
        coordinator: Arc<RoomCoordinator<S>>,
        config: &HostConfig,
    ) -> Result<Self, ImpostoreError> {
        let host_id = ParticipantId::generate_host(&mut rand::rng(), coordinator.now_ms());
        let code = coordinator.create(config.settings, &host_id).await?;
        let heartbeat = spawn_heartbeat(Arc::clone(&coordinator), code.clone(), &config.pulse);

        tracing::info!(%code, host = %host_id, "host session opened");
        Ok(Self {
            join_link: join_link(&config.base_url, &code),
            coordinator,
            code,
            host_id,
            heartbeat: Some(heartbeat),
        })
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host_id(&self) -> &ParticipantId {
        &self.host_id
    }

    /// The URL players open to join this room.
    pub fn join_link(&self) -> &str {
        &self.join_link
    }

    pub fn coordinator(&self) -> &Arc<RoomCoordinator<S>> {
        &self.coordinator
    }

    /// Whether the heartbeat task is still running.
    pub fn is_beating(&self) -> bool {
        self.heartbeat.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn start(&self) -> Result<(), ImpostoreError> {
        Ok(self.coordinator.start(&self.code).await?)
    }

    pub async fn end(&self) -> Result<(), ImpostoreError> {
        Ok(self.coordinator.end(&self.code).await?)
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<(), ImpostoreError> {
        Ok(self.coordinator.update_settings(&self.code, update).await?)
    }

    pub async fn remove(&self, participant: &ParticipantId) -> Result<(), ImpostoreError> {
        Ok(self.coordinator.remove(&self.code, participant).await?)
    }

    pub async fn subscribe(&self) -> Result<Subscription, ImpostoreError> {
        Ok(self.coordinator.subscribe(&self.code).await?)
    }

    /// Stops the heartbeat and deletes the room.
    pub async fn close(mut self) -> Result<(), ImpostoreError> {
        self.stop_heartbeat();
        // Deleting here leaves nothing for Drop to do.
        let coordinator = Arc::clone(&self.coordinator);
        let code = self.code.clone();
        drop(self);
        coordinator.delete(&code).await?;
        Ok(())
    }

    fn stop_heartbeat(&mut self) {
        if let Some(handle) = self.heartbeat.take() {
            handle.abort();
        }
    }
}

impl<S: RoomStore> Drop for HostSession<S> {
    fn drop(&mut self) {
        // `close` already took the handle and deletes the room itself.
        let Some(handle) = self.heartbeat.take() else {
            return;
        };
        handle.abort();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(code = %self.code, "no runtime at drop, room left to the sweeper");
            return;
        };
        let coordinator = Arc::clone(&self.coordinator);
        let code = self.code.clone();
        runtime.spawn(async move {
            if let Err(e) = coordinator.delete(&code).await {
                tracing::warn!(%code, error = %e, "failed to delete room on host exit");
            }
        });
    }
}

fn spawn_heartbeat<S: RoomStore>(
    coordinator: Arc<RoomCoordinator<S>>,
    code: RoomCode,
    pulse: &PulseConfig,
) -> JoinHandle<()> {
    let mut scheduler = PulseScheduler::heartbeat(pulse);
    tokio::spawn(async move {
        loop {
            scheduler.wait_for_pulse().await;
            match coordinator.heartbeat(&code).await {
                Ok(()) => {}
                Err(SessionError::RoomNotFound(_)) => {
                    tracing::info!(%code, "room gone, stopping heartbeat");
                    break;
                }
                Err(e) => tracing::warn!(%code, error = %e, "heartbeat failed"),
            }
        }
    })
}
