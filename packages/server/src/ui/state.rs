//! Shared application state handed to every handler.

use std::sync::Arc;

use pomosync_shared::time::Clock;

use crate::usecase::{
    ApplyActionUseCase, ConnectClientUseCase, DisconnectClientUseCase, GetRoomDetailUseCase,
    SendErrorUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectClientUseCase（ソケット接続のユースケース）
    pub connect_client_usecase: Arc<ConnectClientUseCase>,
    /// ApplyActionUseCase（アクション適用のユースケース）
    pub apply_action_usecase: Arc<ApplyActionUseCase>,
    /// DisconnectClientUseCase（ソケット切断のユースケース）
    pub disconnect_client_usecase: Arc<DisconnectClientUseCase>,
    /// SendErrorUseCase（エラー返信のユースケース）
    pub send_error_usecase: Arc<SendErrorUseCase>,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    /// 現在時刻の取得元（メッセージごとに 1 回だけ読む）
    pub clock: Arc<dyn Clock>,
}
