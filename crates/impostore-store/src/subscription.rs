//! Per-room change subscriptions.

use impostore_protocol::{Room, RoomCode};
use tokio::sync::mpsc;

/// One change notification: the room's full state after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomUpdate {
    Present(Room),
    /// The room no longer exists.
    Deleted,
}

impl RoomUpdate {
    pub fn room(&self) -> Option<&Room> {
        match self {
            Self::Present(room) => Some(room),
            Self::Deleted => None,
        }
    }
}

/// Channel sender a store uses to push updates to one subscriber.
pub(crate) type UpdateSender = mpsc::UnboundedSender<RoomUpdate>;

/// A live subscription to one room.
///
/// Updates arrive in the order the store applied them. Dropping the
/// subscription (or calling [`unsubscribe`](Self::unsubscribe)) detaches
/// it; the store prunes the dead sender on its next notification.
#[derive(Debug)]
pub struct Subscription {
    code: RoomCode,
    receiver: mpsc::UnboundedReceiver<RoomUpdate>,
}

impl Subscription {
    /// Creates a subscription and the sender a store keeps for it.
    ///
    /// Public so out-of-tree [`RoomStore`](crate::RoomStore)
    /// implementations can hand out subscriptions too.
    pub fn channel(code: RoomCode) -> (mpsc::UnboundedSender<RoomUpdate>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { code, receiver: rx })
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Waits for the next update. `None` once the store has dropped its
    /// side of the channel.
    pub async fn recv(&mut self) -> Option<RoomUpdate> {
        self.receiver.recv().await
    }

    /// Returns an already-delivered update without waiting.
    pub fn try_recv(&mut self) -> Option<RoomUpdate> {
        self.receiver.try_recv().ok()
    }

    /// Skips ahead to the most recent delivered update, if any.
    pub fn latest(&mut self) -> Option<RoomUpdate> {
        let mut last = None;
        while let Some(update) = self.try_recv() {
            last = Some(update);
        }
        last
    }

    /// Stops receiving updates.
    pub fn unsubscribe(mut self) {
        self.receiver.close();
        tracing::debug!(code = %self.code, "unsubscribed from room");
    }
}
