//! Host-side configuration.

use impostore_protocol::RoomSettings;
use impostore_pulse::PulseConfig;

/// Everything [`HostSession::open`](crate::HostSession::open) needs.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Page players open to join; the room code is appended as `?room=`.
    pub base_url: String,
    /// Settings for the room when it is created.
    pub settings: RoomSettings,
    /// Heartbeat timing.
    pub pulse: PulseConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            settings: RoomSettings::default(),
            pulse: PulseConfig::default(),
        }
    }
}

impl HostConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_settings(mut self, settings: RoomSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_pulse(mut self, pulse: PulseConfig) -> Self {
        self.pulse = pulse.validated();
        self
    }
}
