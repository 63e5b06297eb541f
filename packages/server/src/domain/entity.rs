//! Domain entities.

use super::{
    room_state::RoomState,
    value_object::{RoomId, Timestamp},
};

/// A registered room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    pub enabled: bool,
}

impl Room {
    /// New enabled room.
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            enabled: true,
        }
    }
}

/// The `(version, state)` pair last persisted for a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub version: u64,
    pub state: RoomState,
    pub updated_at: Timestamp,
}

/// Full room state as delivered to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub version: u64,
    pub server_now: Timestamp,
    pub state: RoomState,
}

/// Error codes reported to the originating socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorCode {
    /// The room runtime was evicted; the client should reconnect.
    RoomNotLoaded,
    BadJson,
    UnknownMsg,
    /// The action could not be persisted and was discarded.
    StorageError,
}

impl SyncErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomNotLoaded => "ROOM_NOT_LOADED",
            Self::BadJson => "BAD_JSON",
            Self::UnknownMsg => "UNKNOWN_MSG",
            Self::StorageError => "STORAGE_ERROR",
        }
    }
}

/// Recoverable protocol error. Never closes the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncError {
    pub code: SyncErrorCode,
    pub message: String,
}

impl SyncError {
    pub fn new(code: SyncErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn room_not_loaded() -> Self {
        Self::new(SyncErrorCode::RoomNotLoaded, "Room runtime missing")
    }

    pub fn bad_json() -> Self {
        Self::new(SyncErrorCode::BadJson, "Invalid JSON")
    }

    pub fn unknown_msg() -> Self {
        Self::new(SyncErrorCode::UnknownMsg, "Unknown message type")
    }

    pub fn storage_error() -> Self {
        Self::new(SyncErrorCode::StorageError, "Failed to persist room state")
    }
}
