//! UseCase テスト用のヘルパー

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionId, MessagePushError, MessagePusher, PusherChannel, Room, RoomId,
        RoomRepository, RoomRuntime, RoomRuntimeCache, RoomSnapshot, RoomState, SyncError,
        Timestamp,
    },
    infrastructure::repository::SqliteRoomRepository,
};

pub const ROOM_ID: &str = "12345678";

pub fn room_id() -> RoomId {
    RoomId::new(ROOM_ID.to_string()).unwrap()
}

/// 送信内容を記録する MessagePusher
#[derive(Debug, Clone, PartialEq)]
pub enum Pushed {
    Snapshot(ConnectionId, RoomSnapshot),
    Error(ConnectionId, SyncError),
}

#[derive(Default)]
pub struct RecordingPusher {
    pub registered: Mutex<Vec<ConnectionId>>,
    pub pushed: Mutex<Vec<Pushed>>,
}

impl RecordingPusher {
    pub async fn pushed(&self) -> Vec<Pushed> {
        self.pushed.lock().await.clone()
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, connection_id: ConnectionId, _sender: PusherChannel) {
        self.registered.lock().await.push(connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.registered.lock().await.retain(|id| id != connection_id);
    }

    async fn push_snapshot(
        &self,
        connection_id: &ConnectionId,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError> {
        self.pushed
            .lock()
            .await
            .push(Pushed::Snapshot(*connection_id, snapshot.clone()));
        Ok(())
    }

    async fn push_error(
        &self,
        connection_id: &ConnectionId,
        error: &SyncError,
    ) -> Result<(), MessagePushError> {
        self.pushed
            .lock()
            .await
            .push(Pushed::Error(*connection_id, error.clone()));
        Ok(())
    }

    async fn broadcast_snapshot(
        &self,
        targets: Vec<ConnectionId>,
        snapshot: &RoomSnapshot,
    ) -> Result<(), MessagePushError> {
        let mut pushed = self.pushed.lock().await;
        for target in targets {
            pushed.push(Pushed::Snapshot(target, snapshot.clone()));
        }
        Ok(())
    }
}

/// ルームを 1 つ登録したインメモリ SQLite リポジトリ
pub async fn create_repository_with_room() -> Arc<SqliteRoomRepository> {
    let repository = SqliteRoomRepository::open_in_memory().unwrap();
    repository
        .create_room(&Room::new(room_id(), Timestamp::new(0)))
        .await
        .unwrap();
    Arc::new(repository)
}

/// 指定のソケットが接続済みのランタイムをキャッシュに載せる
pub async fn load_runtime(
    cache: &RoomRuntimeCache,
    version: u64,
    state: RoomState,
    connections: &[ConnectionId],
) {
    let mut guard = cache.lock(&room_id()).await;
    let runtime = guard.get_or_insert(RoomRuntime::new(version, state));
    runtime.connections.extend(connections.iter().copied());
}
