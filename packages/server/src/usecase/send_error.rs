//! UseCase: エラー返信
//!
//! 不正なフレームに対して送信元のソケットにのみエラーを返します。
//! 接続は閉じません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, SyncError};

/// エラー返信のユースケース
pub struct SendErrorUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl SendErrorUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        error: SyncError,
    ) -> Result<(), MessagePushError> {
        tracing::debug!(
            "Replying {} to connection '{}'",
            error.code.as_str(),
            connection_id
        );
        self.message_pusher.push_error(connection_id, &error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Pushed, RecordingPusher};

    #[tokio::test]
    async fn test_error_goes_to_origin_only() {
        // テスト項目: エラーは送信元のソケットにのみ送られる
        // given (前提条件):
        let pusher = Arc::new(RecordingPusher::default());
        let usecase = SendErrorUseCase::new(pusher.clone());
        let origin = ConnectionId::generate();

        // when (操作):
        usecase
            .execute(&origin, SyncError::unknown_msg())
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            pusher.pushed().await,
            vec![Pushed::Error(origin, SyncError::unknown_msg())]
        );
    }
}
