//! The `RoomStore` trait.

use std::future::Future;

use impostore_protocol::{Room, RoomCode, RoomPatch};

use crate::{StoreError, Subscription};

/// The shared store as seen by the coordinator.
///
/// Addressing is a room code plus a field path inside that room's record.
/// Implementations must guarantee that one `apply_atomic` call is applied
/// as a unit and observed by subscribers as a single snapshot change.
/// Nothing is guaranteed across calls: last writer wins per path.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because one store handle is shared by the
/// coordinator, the heartbeat task and the sweeper.
pub trait RoomStore: Send + Sync + 'static {
    /// Stores a new room.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if `code` is live.
    fn create(
        &self,
        code: &RoomCode,
        room: &Room,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Reads a room's full state, `None` if absent.
    fn read(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<Room>, StoreError>> + Send;

    /// Applies every write in `patch` or none of them.
    ///
    /// # Errors
    /// - [`StoreError::RoomNotFound`] if the room is absent
    /// - [`StoreError::Protocol`] if the patch is malformed or would leave
    ///   the record undecodable
    fn apply_atomic(
        &self,
        code: &RoomCode,
        patch: RoomPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Removes a room. Deleting an absent room is not an error.
    fn delete(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Starts watching a room. The first update delivered is the state at
    /// subscription time (possibly [`RoomUpdate::Deleted`](crate::RoomUpdate::Deleted)).
    fn subscribe(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Subscription, StoreError>> + Send;

    /// Every live room. Used by the abandonment sweep.
    fn scan(&self) -> impl Future<Output = Result<Vec<(RoomCode, Room)>, StoreError>> + Send;
}
