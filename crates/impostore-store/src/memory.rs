//! In-process `RoomStore`.
//!
//! Holds each room as a JSON record tree, exactly like a hosted document
//! store would, so field-path patches behave the same way they do in
//! production. All state sits behind one async mutex; every operation
//! takes the lock once, which makes each call atomic with respect to the
//! others and keeps notifications ordered per room.

use std::collections::HashMap;
use std::sync::Arc;

use impostore_protocol::{Room, RoomCode, RoomPatch, decode_room, encode_room};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::subscription::UpdateSender;
use crate::{RoomStore, RoomUpdate, StoreError, Subscription};

#[derive(Default)]
struct Inner {
    records: HashMap<RoomCode, Value>,
    watchers: HashMap<RoomCode, Vec<UpdateSender>>,
}

impl Inner {
    /// Pushes `update` to every live subscriber of `code`, dropping the
    /// ones whose receiver is gone.
    fn notify(&mut self, code: &RoomCode, update: RoomUpdate) {
        if let Some(senders) = self.watchers.get_mut(code) {
            senders.retain(|tx| tx.send(update.clone()).is_ok());
            if senders.is_empty() {
                self.watchers.remove(code);
            }
        }
    }
}

/// A shared, in-memory room store. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Number of attached subscribers for `code` (including ones whose
    /// receiver was dropped since the last notification).
    pub async fn subscriber_count(&self, code: &RoomCode) -> usize {
        self.inner
            .lock()
            .await
            .watchers
            .get(code)
            .map_or(0, Vec::len)
    }
}

impl RoomStore for MemoryStore {
    async fn create(&self, code: &RoomCode, room: &Room) -> Result<(), StoreError> {
        let record = encode_room(room)?;
        let mut inner = self.inner.lock().await;
        if inner.records.contains_key(code) {
            return Err(StoreError::AlreadyExists(code.clone()));
        }
        inner.records.insert(code.clone(), record);
        inner.notify(code, RoomUpdate::Present(room.clone()));
        tracing::debug!(%code, "room record created");
        Ok(())
    }

    async fn read(&self, code: &RoomCode) -> Result<Option<Room>, StoreError> {
        let inner = self.inner.lock().await;
        match inner.records.get(code) {
            Some(record) => Ok(Some(decode_room(record.clone())?)),
            None => Ok(None),
        }
    }

    async fn apply_atomic(&self, code: &RoomCode, patch: RoomPatch) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .records
            .get(code)
            .ok_or_else(|| StoreError::RoomNotFound(code.clone()))?;

        // Work on a copy so a failing write leaves the record untouched.
        let mut next = current.clone();
        patch.apply_to(&mut next)?;
        let room = decode_room(next.clone())?;

        inner.records.insert(code.clone(), next);
        inner.notify(code, RoomUpdate::Present(room));
        tracing::trace!(%code, writes = patch.len(), "patch applied");
        Ok(())
    }

    async fn delete(&self, code: &RoomCode) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.records.remove(code).is_some() {
            inner.notify(code, RoomUpdate::Deleted);
            tracing::debug!(%code, "room record deleted");
        }
        Ok(())
    }

    async fn subscribe(&self, code: &RoomCode) -> Result<Subscription, StoreError> {
        let mut inner = self.inner.lock().await;
        let initial = match inner.records.get(code) {
            Some(record) => RoomUpdate::Present(decode_room(record.clone())?),
            None => RoomUpdate::Deleted,
        };
        let (tx, subscription) = Subscription::channel(code.clone());
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(initial);
        inner.watchers.entry(code.clone()).or_default().push(tx);
        Ok(subscription)
    }

    async fn scan(&self) -> Result<Vec<(RoomCode, Room)>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rooms: Vec<(RoomCode, Room)> = inner
            .records
            .iter()
            .filter_map(|(code, record)| match decode_room(record.clone()) {
                Ok(room) => Some((code.clone(), room)),
                Err(e) => {
                    tracing::warn!(%code, error = %e, "skipping undecodable room record");
                    None
                }
            })
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(rooms)
    }
}
