//! UseCase: アクション適用
//!
//! キャッシュのガードを保持したまま次を行い、ルームごとのアクションを到着順に直列化します。
//!
//! 1. `reduce(current, action, now)` で次の状態を計算
//! 2. `version + 1` で永続化（upsert）
//! 3. 成功した場合のみランタイムを更新し、ルームの全ソケットへブロードキャスト
//!
//! 永続化に失敗した場合はランタイムを変更せず、送信元にのみ `STORAGE_ERROR` を返します。

use std::sync::Arc;

use crate::domain::{
    Action, ConnectionId, MessagePusher, RoomId, RoomRepository, RoomRuntimeCache, RoomSnapshot,
    SyncError, Timestamp, reduce,
};

use super::error::ApplyActionError;

/// アクション適用のユースケース
pub struct ApplyActionUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    cache: Arc<RoomRuntimeCache>,
}

impl ApplyActionUseCase {
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

    /// アクションを適用する
    ///
    /// # Arguments
    ///
    /// * `room_id` - ソケットが接続しているルーム
    /// * `connection_id` - 送信元のソケット（エラーの返信先）
    /// * `action` - 適用するアクション
    /// * `now` - このメッセージに対して一度だけ取得した現在時刻
    ///
    /// # Returns
    ///
    /// * `Ok(RoomSnapshot)` - ブロードキャストしたスナップショット
    /// * `Err(ApplyActionError)` - 送信元にエラーを返した（状態は変更なし）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        action: &Action,
        now: Timestamp,
    ) -> Result<RoomSnapshot, ApplyActionError> {
        let mut guard = self.cache.lock(room_id).await;

        let Some(runtime) = guard.get_mut() else {
            tracing::warn!(
                "Action from connection '{}' for room '{}' without a loaded runtime",
                connection_id,
                room_id
            );
            self.reply_error(connection_id, &SyncError::room_not_loaded())
                .await;
            return Err(ApplyActionError::RoomNotLoaded(room_id.to_string()));
        };

        let next_state = reduce(&runtime.state, action, now.value());
        let next_version = runtime.version + 1;

        if let Err(e) = self
            .repository
            .save_snapshot(room_id, next_version, &next_state, now)
            .await
        {
            tracing::error!(
                "Failed to persist room '{}' at version {}: {}",
                room_id,
                next_version,
                e
            );
            self.reply_error(connection_id, &SyncError::storage_error())
                .await;
            return Err(ApplyActionError::Storage(e));
        }

        runtime.version = next_version;
        runtime.state = next_state;
        let snapshot = runtime.snapshot(room_id, now);
        let targets = runtime.targets();

        tracing::debug!(
            "Room '{}' advanced to version {} by {:?}",
            room_id,
            next_version,
            action
        );

        if let Err(e) = self
            .message_pusher
            .broadcast_snapshot(targets, &snapshot)
            .await
        {
            tracing::warn!("Failed to broadcast room '{}': {}", room_id, e);
        }

        Ok(snapshot)
    }

    async fn reply_error(&self, connection_id: &ConnectionId, error: &SyncError) {
        if let Err(e) = self.message_pusher.push_error(connection_id, error).await {
            tracing::warn!(
                "Failed to send {} to connection '{}': {}",
                error.code.as_str(),
                connection_id,
                e
            );
        }
    }
}
