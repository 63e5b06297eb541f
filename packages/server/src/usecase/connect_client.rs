//! UseCase: ソケット接続処理
//!
//! 1. ルームの存在と有効性を確認する（アップグレード前に UI 層から呼ばれる）
//! 2. ランタイムが無ければ永続化された `(version, state)` をロードする
//!    （無い・壊れている場合は version 0 とデフォルト状態）
//! 3. ソケットを登録し、現在のスナップショットを即座に送信する
//!
//! 接続時には自動終了判定を行いません。判定はアクション適用時のみです。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, PusherChannel, RoomId, RoomRepository, RoomRuntime,
    RoomRuntimeCache, RoomSnapshot, RoomState, Timestamp,
};

use super::error::ConnectError;

/// ソケット接続のユースケース
pub struct ConnectClientUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    cache: Arc<RoomRuntimeCache>,
}

impl ConnectClientUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        cache: Arc<RoomRuntimeCache>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            cache,
        }
    }

    /// ルームが存在し、かつ有効であることを確認
    pub async fn check_room(&self, room_id: &RoomId) -> Result<(), ConnectError> {
        if self.repository.is_room_enabled(room_id).await? {
            Ok(())
        } else {
            Err(ConnectError::RoomNotFound(room_id.to_string()))
        }
    }

    /// ソケットをルームに接続する
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - 接続したソケットに送信したスナップショット
    /// * `Err(ConnectError)` - ロードに失敗した（ソケットは登録されない）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: ConnectionId,
        sender: PusherChannel,
        now: Timestamp,
    ) -> Result<RoomSnapshot, ConnectError> {
        let mut guard = self.cache.lock(room_id).await;

        let loaded = match guard.get() {
            Some(_) => None,
            None => {
                let runtime = match self.repository.load_snapshot(room_id).await? {
                    Some(stored) => RoomRuntime::new(stored.version, stored.state),
                    None => RoomRuntime::new(0, RoomState::default()),
                };
                tracing::debug!(
                    "Loaded runtime for room '{}' at version {}",
                    room_id,
                    runtime.version
                );
                Some(runtime)
            }
        };

        let runtime = match loaded {
            Some(runtime) => guard.get_or_insert(runtime),
            None => guard
                .get_mut()
                .ok_or_else(|| ConnectError::RoomNotFound(room_id.to_string()))?,
        };
        runtime.connections.insert(connection_id);
        let snapshot = runtime.snapshot(room_id, now);

        // ガードを保持したまま送信し、スナップショットより先にブロードキャストが届かないようにする
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        if let Err(e) = self
            .message_pusher
            .push_snapshot(&connection_id, &snapshot)
            .await
        {
            tracing::warn!(
                "Failed to send initial snapshot to connection '{}': {}",
                connection_id,
                e
            );
        }

        tracing::info!(
            "Connection '{}' joined room '{}' (version {}, {} sockets)",
            connection_id,
            room_id,
            snapshot.version,
            runtime.connections.len()
        );

        Ok(snapshot)
    }
}
