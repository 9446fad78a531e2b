//! Field paths and multi-path patches.
//!
//! The shared store addresses a room as a tree of named fields. A
//! [`RoomPatch`] is a set of `(path, value)` writes applied as one unit:
//! either every write lands or none does. A `None` value removes whatever
//! is stored at that path. An [`update`](RoomPatch::update) only lands if
//! the entry it writes into still exists, so a player who left after the
//! caller's read is not brought back as a partial entry.
//!
//! ```text
//! status                  → "active"
//! firstPlayerId           → "p-42"
//! players/p-42/isFirst    → true
//! players/p-7/role        → (removed)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::{ParticipantId, ProtocolError, Room};

/// Field names of the persisted record, as serde writes them.
pub mod fields {
    pub const WORD: &str = "word";
    pub const HINT: &str = "hint";
    pub const STATUS: &str = "status";
    pub const NUM_IMPOSTORS: &str = "numImpostors";
    pub const HOST_ID: &str = "hostId";
    pub const HINT_ENABLED: &str = "hintEnabled";
    pub const HINT_ONLY_FIRST: &str = "hintOnlyFirst";
    pub const FIRST_PLAYER_ID: &str = "firstPlayerId";
    pub const CREATED_AT: &str = "createdAt";
    pub const LAST_HEARTBEAT: &str = "lastHeartbeat";
    pub const PLAYERS: &str = "players";

    // Player fields.
    pub const NAME: &str = "name";
    pub const ROLE: &str = "role";
    pub const IS_FIRST: &str = "isFirst";
    pub const REVEALED: &str = "revealed";
    pub const JOINED_AT: &str = "joinedAt";
}

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

/// A `/`-separated path inside one room record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// A top-level field such as `status`.
    pub fn field(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    /// A whole player entry: `players/{id}`.
    pub fn player(id: &ParticipantId) -> Self {
        Self(vec![fields::PLAYERS.to_string(), id.as_str().to_string()])
    }

    /// One field of a player entry: `players/{id}/{name}`.
    pub fn player_field(id: &ParticipantId, name: &str) -> Self {
        let mut path = Self::player(id);
        path.0.push(name.to_string());
        path
    }

    /// Parses `"players/p-1/role"`. Empty paths and empty segments are
    /// rejected.
    pub fn parse(path: &str) -> Result<Self, ProtocolError> {
        let segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ProtocolError::InvalidPath(path.to_string()));
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

// ---------------------------------------------------------------------------
// RoomPatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Write {
    Set(Value),
    Update(Value),
    Remove,
}

/// A batch of field writes applied atomically to one room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomPatch {
    writes: BTreeMap<FieldPath, Write>,
}

impl RoomPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` at `path`. A later write to the same path replaces
    /// an earlier one. Writing `Value::Null` is the same as [`remove`](Self::remove).
    pub fn set(&mut self, path: FieldPath, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let write = if value.is_null() { Write::Remove } else { Write::Set(value) };
        self.writes.insert(path, write);
        self
    }

    /// Writes `value` at `path` only if the parent of `path` exists when
    /// the patch is applied; otherwise the write is dropped. Missing
    /// parents are never created.
    pub fn update(&mut self, path: FieldPath, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let write = if value.is_null() { Write::Remove } else { Write::Update(value) };
        self.writes.insert(path, write);
        self
    }

    /// Removes whatever is stored at `path`.
    pub fn remove(&mut self, path: FieldPath) -> &mut Self {
        self.writes.insert(path, Write::Remove);
        self
    }

    /// Writes `Some(v)` or removes on `None`.
    pub fn set_opt(&mut self, path: FieldPath, value: Option<impl Into<Value>>) -> &mut Self {
        match value {
            Some(v) => self.set(path, v),
            None => self.remove(path),
        }
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Iterates writes in path order; `None` is a removal.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, Option<&Value>)> {
        self.writes.iter().map(|(path, write)| match write {
            Write::Set(value) | Write::Update(value) => (path, Some(value)),
            Write::Remove => (path, None),
        })
    }

    /// Applies every write to `record` in place.
    ///
    /// Two writes where one path is an ancestor of the other are rejected
    /// before anything is touched, because their combined effect would
    /// depend on application order. A write that needs to descend through
    /// a non-object value fails; callers that need all-or-nothing must
    /// apply to a copy.
    pub fn apply_to(&self, record: &mut Value) -> Result<(), ProtocolError> {
        // BTreeMap order puts an ancestor immediately before its
        // descendants, so checking neighbours is enough.
        let paths: Vec<&FieldPath> = self.writes.keys().collect();
        for pair in paths.windows(2) {
            if pair[0].is_ancestor_of(pair[1]) {
                return Err(ProtocolError::InvalidPath(format!(
                    "{} overlaps {}",
                    pair[0], pair[1]
                )));
            }
        }

        for (path, write) in &self.writes {
            match write {
                Write::Set(v) => set_at(record, path, v.clone())?,
                Write::Update(v) => update_at(record, path, v.clone())?,
                Write::Remove => remove_at(record, path)?,
            }
        }
        Ok(())
    }
}

fn set_at(record: &mut Value, path: &FieldPath, value: Value) -> Result<(), ProtocolError> {
    let (last, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| ProtocolError::InvalidPath(path.to_string()))?;

    let mut node = record;
    for segment in parents {
        let object = as_object(node, path)?;
        node = object
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_object(node, path)?.insert(last.clone(), value);
    Ok(())
}

fn update_at(record: &mut Value, path: &FieldPath, value: Value) -> Result<(), ProtocolError> {
    let (last, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| ProtocolError::InvalidPath(path.to_string()))?;

    let mut node = record;
    for segment in parents {
        match node.get_mut(segment) {
            Some(child) if !child.is_null() => node = child,
            _ => return Ok(()),
        }
    }
    match node {
        Value::Object(object) => {
            object.insert(last.clone(), value);
            Ok(())
        }
        _ => Err(ProtocolError::InvalidPath(format!(
            "{path} descends into a non-object value"
        ))),
    }
}

fn remove_at(record: &mut Value, path: &FieldPath) -> Result<(), ProtocolError> {
    let (last, parents) = path
        .segments()
        .split_last()
        .ok_or_else(|| ProtocolError::InvalidPath(path.to_string()))?;

    let mut node = record;
    for segment in parents {
        match node.get_mut(segment) {
            Some(child) => node = child,
            // Nothing stored there, so nothing to remove.
            None => return Ok(()),
        }
    }
    if let Value::Object(object) = node {
        object.remove(last);
    }
    Ok(())
}

/// Returns the object at `node`, turning `null` into an empty object.
fn as_object<'a>(
    node: &'a mut Value,
    path: &FieldPath,
) -> Result<&'a mut Map<String, Value>, ProtocolError> {
    if node.is_null() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(object) => Ok(object),
        _ => Err(ProtocolError::InvalidPath(format!(
            "{path} descends into a non-object value"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

/// Converts a room into the record tree stored by the backend.
pub fn encode_room(room: &Room) -> Result<Value, ProtocolError> {
    serde_json::to_value(room).map_err(ProtocolError::Encode)
}

/// Reads a record tree back into a room.
pub fn decode_room(record: Value) -> Result<Room, ProtocolError> {
    serde_json::from_value(record).map_err(ProtocolError::Decode)
}
