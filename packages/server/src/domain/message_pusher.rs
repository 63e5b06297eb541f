//! MessagePusher trait definition.
//!
//! Delivery of outbound frames to connected sockets. The UI layer creates the
//! socket and hands its sender channel over via `register_client`.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    entity::{RoomSnapshot, SyncError},
    error::MessagePushError,
    value_object::ConnectionId,
};

/// Channel carrying serialized frames to one socket's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the sender channel of a socket.
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget a socket.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Send a snapshot to one socket.
    async fn push_snapshot(
        &self,
        connection_id: &ConnectionId,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError>;

    /// Send an error frame to one socket.
    async fn push_error(
        &self,
        connection_id: &ConnectionId,
        error: &SyncError,
    ) -> Result<(), MessagePushError>;

    /// Send a snapshot to every target.
    ///
    /// A failure for one target is logged and does not stop delivery to the others.
    async fn broadcast_snapshot(
        &self,
        targets: Vec<ConnectionId>,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError>;
}
