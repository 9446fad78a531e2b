//! Partial settings updates.

use impostore_protocol::RoomSettings;

/// A partial change to a room's settings. Unset fields keep their
/// current value.
///
/// ```
/// use impostore_session::SettingsUpdate;
///
/// let update = SettingsUpdate::new().num_impostors(2).hint_enabled(true);
/// assert_eq!(update.num_impostors, Some(2));
/// assert_eq!(update.hint_only_first, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub num_impostors: Option<u32>,
    pub hint_enabled: Option<bool>,
    pub hint_only_first: Option<bool>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_impostors(mut self, n: u32) -> Self {
        self.num_impostors = Some(n);
        self
    }

    pub fn hint_enabled(mut self, enabled: bool) -> Self {
        self.hint_enabled = Some(enabled);
        self
    }

    pub fn hint_only_first(mut self, only_first: bool) -> Self {
        self.hint_only_first = Some(only_first);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The settings that result from applying this update to `current`.
    /// `hint_only_first` is forced off whenever hints end up disabled.
    pub fn apply_to(&self, current: RoomSettings) -> RoomSettings {
        RoomSettings {
            num_impostors: self.num_impostors.unwrap_or(current.num_impostors),
            hint_enabled: self.hint_enabled.unwrap_or(current.hint_enabled),
            hint_only_first: self.hint_only_first.unwrap_or(current.hint_only_first),
        }
        .normalized()
    }
}

impl From<RoomSettings> for SettingsUpdate {
    /// An update that sets every field.
    fn from(settings: RoomSettings) -> Self {
        Self {
            num_impostors: Some(settings.num_impostors),
            hint_enabled: Some(settings.hint_enabled),
            hint_only_first: Some(settings.hint_only_first),
        }
    }
}
