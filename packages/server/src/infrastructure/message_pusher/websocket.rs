//! WebSocket を使った MessagePusher 実装
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、DTO を JSON に
//! シリアライズして送信します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomSnapshot, SyncError,
    },
    infrastructure::dto::websocket::{ErrorMessage, StateMessage},
};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// 接続中のソケットと対応する sender のマップ
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new(clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>) -> Self {
        Self { clients }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        frame: String,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        let Some(sender) = clients.get(connection_id) else {
            return Err(MessagePushError::ClientNotFound(connection_id.to_string()));
        };
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed frame to connection '{}'", connection_id);
        Ok(())
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

fn to_frame<T: Serialize>(message: &T) -> Result<String, MessagePushError> {
    serde_json::to_string(message).map_err(|e| MessagePushError::PushFailed(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn push_snapshot(
        &self,
        connection_id: &ConnectionId,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError> {
        let frame = to_frame(&StateMessage::from(snapshot))?;
        self.push_to(connection_id, frame).await
    }

    async fn push_error(
        &self,
        connection_id: &ConnectionId,
        error: &SyncError,
    ) -> Result<(), MessagePushError> {
        let frame = to_frame(&ErrorMessage::from(error))?;
        self.push_to(connection_id, frame).await
    }

    async fn broadcast_snapshot(
        &self,
        targets: Vec<ConnectionId>,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError> {
        let frame = to_frame(&StateMessage::from(snapshot))?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(&target) {
                Some(sender) => {
                    // 一部の送信失敗は許容
                    if let Err(e) = sender.send(frame.clone()) {
                        tracing::warn!("Failed to push snapshot to connection '{}': {}", target, e);
                    } else {
                        tracing::debug!(
                            "Broadcasted snapshot v{} to connection '{}'",
                            snapshot.version,
                            target
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(())
    }
}
