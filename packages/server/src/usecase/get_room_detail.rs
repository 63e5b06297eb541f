//! UseCase: ルーム詳細の取得
//!
//! 登録情報、永続化済みの version と更新日時、現在の接続数をまとめて返します。

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomRepository, RoomRuntimeCache, Timestamp};

use super::error::GetRoomDetailError;

/// ルーム詳細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDetail {
    pub room: Room,
    pub version: u64,
    pub updated_at: Option<Timestamp>,
    pub connected_clients: usize,
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
    cache: Arc<RoomRuntimeCache>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>, cache: Arc<RoomRuntimeCache>) -> Self {
        Self { repository, cache }
    }

    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomDetail, GetRoomDetailError> {
        let Some(room) = self.repository.find_room(room_id).await? else {
            return Err(GetRoomDetailError::RoomNotFound(room_id.to_string()));
        };

        let stored = self.repository.load_snapshot(room_id).await?;
        let live = self
            .cache
            .lock(room_id)
            .await
            .get()
            .map(|runtime| (runtime.version, runtime.connections.len()));
        let live_version = live.map(|(version, _)| version);
        // 壊れた state_json はロード時と同じく version 0 として扱う
        let version = live_version.unwrap_or_else(|| stored.as_ref().map_or(0, |s| s.version));
        let updated_at = stored.map(|s| s.updated_at);

        Ok(RoomDetail {
            room,
            version,
            updated_at,
            connected_clients: live.map_or(0, |(_, count)| count),
        })
    }
}
