//! Domain error types.

use thiserror::Error;

/// Validation errors raised when constructing value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Room id must be exactly 8 ASCII digits, got '{0}'")]
    InvalidRoomId(String),

    #[error("Client id must be 1 to 64 characters, got '{0}'")]
    InvalidClientId(String),
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Delivery errors from a [`MessagePusher`](super::MessagePusher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' not found")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
