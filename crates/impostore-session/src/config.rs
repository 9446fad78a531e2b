//! Coordinator configuration.

/// Tunables for [`RoomCoordinator`](crate::RoomCoordinator).
///
/// Create one with `SessionConfig::default()` and override the fields you
/// care about.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many fresh room codes `create` tries before giving up on
    /// collisions. Default: 5.
    pub create_attempts: u32,

    /// How many extra draws `end` makes when the catalog hands back the
    /// word just played. Default: 10.
    pub end_word_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            create_attempts: 5,
            end_word_retries: 10,
        }
    }
}

impl SessionConfig {
    /// Returns a copy with out-of-range values clamped.
    ///
    /// `create_attempts` must be at least 1, otherwise no room could ever
    /// be created.
    pub fn validated(mut self) -> Self {
        if self.create_attempts == 0 {
            tracing::warn!("create_attempts is 0, clamping to 1");
            self.create_attempts = 1;
        }
        self
    }
}
