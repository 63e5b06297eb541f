//! Repository trait definitions.
//!
//! The domain defines the storage interface it needs; the infrastructure
//! layer provides the implementation (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{Room, StoredSnapshot},
    error::RepositoryError,
    room_state::RoomState,
    value_object::{RoomId, Timestamp},
};

/// Durable room store: room registry plus one snapshot row per room.
///
/// Snapshot writes are last-write-wins keyed by room id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Look up a room by id.
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError>;

    /// Whether the room exists and is enabled.
    async fn is_room_enabled(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;

    /// Load the persisted snapshot.
    ///
    /// Returns `Ok(None)` when nothing was saved yet or the stored JSON is corrupt.
    async fn load_snapshot(&self, room_id: &RoomId)
    -> Result<Option<StoredSnapshot>, RepositoryError>;

    /// Upsert the snapshot of a room.
    async fn save_snapshot(
        &self,
        room_id: &RoomId,
        version: u64,
        state: &RoomState,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// Register a new room. Fails with `RoomAlreadyExists` on id collision.
    async fn create_room(&self, room: &Room) -> Result<(), RepositoryError>;

    /// Remove a room and its snapshot. Returns whether a room was deleted.
    async fn remove_room(&self, room_id: &RoomId) -> Result<bool, RepositoryError>;

    /// All rooms, newest first.
    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError>;
}
