//! UseCase: ソケット切断処理
//!
//! ソケットをルームから外し、最後のソケットであればランタイムを破棄します。
//! 永続化済みのスナップショットは残るため、何も失われません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, RoomRuntimeCache};

/// ソケット切断のユースケース
pub struct DisconnectClientUseCase {
    message_pusher: Arc<dyn MessagePusher>,
    cache: Arc<RoomRuntimeCache>,
}

impl DisconnectClientUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, cache: Arc<RoomRuntimeCache>) -> Self {
        Self {
            message_pusher,
            cache,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// ランタイムが破棄された場合は `true`
    pub async fn execute(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let evicted = {
            let mut guard = self.cache.lock(room_id).await;
            guard.detach(connection_id)
        };
        self.message_pusher.unregister_client(connection_id).await;

        if evicted {
            tracing::info!(
                "Connection '{}' left room '{}'; runtime evicted",
                connection_id,
                room_id
            );
        } else {
            tracing::info!("Connection '{}' left room '{}'", connection_id, room_id);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::RoomState,
        usecase::test_support::{RecordingPusher, load_runtime, room_id},
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_last_disconnect_evicts_runtime() {
        // テスト項目: 最後のソケットが切断されるとランタイムが破棄される
        // given (前提条件):
        let pusher = Arc::new(RecordingPusher::default());
        let cache = Arc::new(RoomRuntimeCache::new());
        let usecase = DisconnectClientUseCase::new(pusher.clone(), cache.clone());
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        load_runtime(&cache, 2, RoomState::default(), &[alice, bob]).await;
        for id in [alice, bob] {
            let (tx, _rx) = mpsc::unbounded_channel();
            pusher.register_client(id, tx).await;
        }

        // when (操作):
        let first = usecase.execute(&room_id(), &alice).await;
        let second = usecase.execute(&room_id(), &bob).await;

        // then (期待する結果):
        assert!(!first);
        assert!(second);
        assert!(!cache.is_loaded(&room_id()).await);
        assert!(pusher.registered.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_keeps_runtime_for_remaining_sockets() {
        // テスト項目: 他のソケットが残っていればランタイムと version は維持される
        // given (前提条件):
        let pusher = Arc::new(RecordingPusher::default());
        let cache = Arc::new(RoomRuntimeCache::new());
        let usecase = DisconnectClientUseCase::new(pusher, cache.clone());
        let alice = ConnectionId::generate();
        let bob = ConnectionId::generate();
        load_runtime(&cache, 9, RoomState::default(), &[alice, bob]).await;

        // when (操作):
        usecase.execute(&room_id(), &alice).await;

        // then (期待する結果):
        let guard = cache.lock(&room_id()).await;
        let runtime = guard.get().unwrap();
        assert_eq!(runtime.version, 9);
        assert_eq!(runtime.targets(), vec![bob]);
    }
}
