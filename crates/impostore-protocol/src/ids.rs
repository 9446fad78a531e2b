//! Identity types: room codes and participant ids.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Symbols a room code is drawn from.
const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every room code.
pub const ROOM_CODE_LEN: usize = 6;

/// Characters that cannot appear in a participant id because the store
/// addresses records by `/`-separated paths.
const RESERVED_ID_CHARS: &[char] = &['/', '.', '#', '$', '[', ']'];

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// The externally shareable identifier of a room, e.g. `"K7Q2ZD"`.
///
/// Codes are generated client-side with no uniqueness pre-check; the store
/// rejects a collision on create and the caller draws a fresh one.
///
/// `#[serde(transparent)]` keeps the wire form a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Draws a fresh 6-character code from `A-Z0-9`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..ROOM_CODE_LEN)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Parses a code typed or scanned by a user.
    ///
    /// Surrounding whitespace is ignored and lowercase input is accepted,
    /// so `" k7q2zd "` parses to `K7Q2ZD`.
    pub fn parse(input: &str) -> Result<Self, ProtocolError> {
        let normalized = input.trim().to_ascii_uppercase();
        let valid = normalized.len() == ROOM_CODE_LEN
            && normalized.bytes().all(|b| CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(normalized))
        } else {
            Err(ProtocolError::InvalidRoomCode(input.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Identifies one participant (host or player) across rooms.
///
/// Used as a key in the room's `players` map and therefore as a path
/// segment, so it must be non-empty and free of path-reserved characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Validates and wraps an id.
    pub fn new(id: impl Into<String>) -> Result<Self, ProtocolError> {
        let id = id.into();
        if id.is_empty() || id.contains(RESERVED_ID_CHARS) {
            return Err(ProtocolError::InvalidParticipantId(id));
        }
        Ok(Self(id))
    }

    /// Generates an id for a host device: `host-{now_ms}-{9 base36 chars}`.
    pub fn generate_host<R: Rng + ?Sized>(rng: &mut R, now_ms: u64) -> Self {
        const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let suffix: String = (0..9)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("host-{now_ms}-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
