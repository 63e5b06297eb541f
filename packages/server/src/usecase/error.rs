//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RepositoryError;

/// 接続処理のエラー
#[derive(Debug, Error)]
pub enum ConnectError {
    /// ルームが存在しない、または無効化されている
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// アクション適用のエラー
#[derive(Debug, Error)]
pub enum ApplyActionError {
    /// ランタイムがキャッシュに存在しない
    #[error("Room '{0}' is not loaded")]
    RoomNotLoaded(String),

    /// 永続化に失敗した（状態は変更されていない）
    #[error("Failed to persist room state: {0}")]
    Storage(#[from] RepositoryError),
}

/// ルーム管理のエラー
#[derive(Debug, Error)]
pub enum ManageRoomsError {
    #[error("Room '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// ランダム ID の生成が衝突し続けた
    #[error("Could not find a free room id after {0} attempts")]
    IdSpaceExhausted(usize),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ManageRoomsError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::RoomAlreadyExists(id) => Self::RoomAlreadyExists(id),
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Error)]
pub enum GetRoomDetailError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
