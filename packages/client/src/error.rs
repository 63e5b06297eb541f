//! Error types for the sync client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server rejected the room (unknown, disabled or malformed id)
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// No open connection; the action was dropped
    #[error("Not connected to a room")]
    NotConnected,
}
