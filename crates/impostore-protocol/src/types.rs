//! The persisted room record.
//!
//! Field names are camelCase on the wire because the coordinator addresses
//! individual fields by path (`numImpostors`, `players/{id}/isFirst`) and
//! those paths must match what serde produces.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ParticipantId;

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
///             start            end
/// Waiting ──────────→ Active ────────→ Waiting ...
///    │                  │
///    └──── delete / sweep / host teardown ────→ (absent)
/// ```
///
/// Deletion is not a status: a deleted room is simply absent from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Lobby: settings and membership may change, no roles dealt.
    #[default]
    Waiting,
    /// A round is running: every player holds a role.
    Active,
}

impl RoomStatus {
    /// Returns `true` if settings may be changed and a round may start.
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A player's role for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Knows the secret word.
    Civilian,
    /// Does not know the word; may see a hint.
    Impostor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Civilian => "civilian",
            Self::Impostor => "impostor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One participant's entry in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name. Uniqueness is advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `None` while waiting.
    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub is_first: bool,

    /// Set once the participant has opened their role card.
    #[serde(default)]
    pub revealed: bool,

    /// Milliseconds since the Unix epoch.
    pub joined_at: u64,
}

impl Player {
    /// A freshly joined participant with waiting-shaped fields.
    pub fn new(name: Option<String>, joined_at: u64) -> Self {
        Self {
            name,
            role: None,
            is_first: false,
            revealed: false,
            joined_at,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// The host-controlled knobs of a room. Preserved across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub num_impostors: u32,
    pub hint_enabled: bool,
    /// Only meaningful while `hint_enabled` is true.
    pub hint_only_first: bool,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            num_impostors: 1,
            hint_enabled: false,
            hint_only_first: false,
        }
    }
}

impl RoomSettings {
    /// Returns a copy with `hint_only_first` cleared when hints are off.
    pub fn normalized(mut self) -> Self {
        if !self.hint_enabled {
            self.hint_only_first = false;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A room's full persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Current secret word. Empty until the first round starts.
    #[serde(default)]
    pub word: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    pub status: RoomStatus,

    pub num_impostors: u32,

    pub host_id: ParticipantId,

    #[serde(default)]
    pub hint_enabled: bool,

    #[serde(default)]
    pub hint_only_first: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_player_id: Option<ParticipantId>,

    pub created_at: u64,

    /// Last time the host signalled liveness. Rooms without one are never
    /// swept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<u64>,

    #[serde(default)]
    pub players: BTreeMap<ParticipantId, Player>,
}

impl Room {
    /// Builds the initial record for a new room: waiting, host as sole
    /// player, heartbeat stamped at creation.
    pub fn new_waiting(host_id: ParticipantId, settings: RoomSettings, now_ms: u64) -> Self {
        let settings = settings.normalized();
        let mut players = BTreeMap::new();
        players.insert(host_id.clone(), Player::new(None, now_ms));
        Self {
            word: String::new(),
            hint: None,
            status: RoomStatus::Waiting,
            num_impostors: settings.num_impostors,
            host_id,
            hint_enabled: settings.hint_enabled,
            hint_only_first: settings.hint_only_first,
            first_player_id: None,
            created_at: now_ms,
            last_heartbeat: Some(now_ms),
            players,
        }
    }

    pub fn settings(&self) -> RoomSettings {
        RoomSettings {
            num_impostors: self.num_impostors,
            hint_enabled: self.hint_enabled,
            hint_only_first: self.hint_only_first,
        }
    }

    pub fn is_host(&self, participant: &ParticipantId) -> bool {
        &self.host_id == participant
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// How many players have opened their role card this round.
    pub fn revealed_count(&self) -> usize {
        self.players.values().filter(|p| p.revealed).count()
    }

    pub fn first_player(&self) -> Option<(&ParticipantId, &Player)> {
        let id = self.first_player_id.as_ref()?;
        self.players.get_key_value(id)
    }

    /// Returns `true` if no current occupant uses `name` (trimmed,
    /// case-insensitive). Blank names never clash.
    pub fn is_name_available(&self, name: &str) -> bool {
        !self.name_held_by_other(name, None)
    }

    /// Whether a player other than `participant` already uses `name`
    /// (same comparison as [`is_name_available`](Self::is_name_available)).
    pub fn name_held_by_other(&self, name: &str, participant: Option<&ParticipantId>) -> bool {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        self.players
            .iter()
            .filter(|(id, _)| Some(*id) != participant)
            .filter_map(|(_, p)| p.name.as_deref())
            .any(|existing| existing.trim().to_lowercase() == wanted)
    }

    /// What `participant` is allowed to see about the current round.
    ///
    /// Civilians see the word. Impostors see the hint only when hints are
    /// enabled and either every impostor gets it or this impostor is the
    /// first player.
    pub fn role_card(&self, participant: &ParticipantId) -> RoleCard {
        let Some(player) = self.players.get(participant) else {
            return RoleCard::Unassigned;
        };
        match player.role {
            None => RoleCard::Unassigned,
            Some(Role::Civilian) => RoleCard::Civilian {
                word: self.word.clone(),
                is_first: player.is_first,
            },
            Some(Role::Impostor) => {
                let hint_visible =
                    self.hint_enabled && (!self.hint_only_first || player.is_first);
                RoleCard::Impostor {
                    hint: self.hint.clone().filter(|_| hint_visible),
                    is_first: player.is_first,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RoleCard
// ---------------------------------------------------------------------------

/// The private view of a round for a single participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCard {
    /// No role dealt yet (lobby, or joined after the round started).
    Unassigned,
    Civilian { word: String, is_first: bool },
    Impostor { hint: Option<String>, is_first: bool },
}
