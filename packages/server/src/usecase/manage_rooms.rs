//! UseCase: ルーム管理（追加・削除・一覧）
//!
//! 管理用 CLI（`pomosync-rooms`）から利用されます。
//! ID を指定しない追加では 8 桁のランダム ID を生成し、既存のルームと衝突しない ID を選びます。

use std::sync::Arc;

use crate::domain::{Room, RoomId, RoomIdFactory, RoomRepository, Timestamp};

use super::error::ManageRoomsError;

/// ランダム ID の試行回数の上限
pub const MAX_ID_ATTEMPTS: usize = 32;

type IdGenerator = Box<dyn Fn() -> RoomId + Send + Sync>;

/// ルーム管理のユースケース
pub struct ManageRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    id_generator: IdGenerator,
}

impl ManageRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self::with_id_generator(repository, Box::new(RoomIdFactory::generate))
    }

    /// ID 生成器を差し替えて作成
    pub fn with_id_generator(repository: Arc<dyn RoomRepository>, id_generator: IdGenerator) -> Self {
        Self {
            repository,
            id_generator,
        }
    }

    /// ルームを追加する
    ///
    /// # Arguments
    ///
    /// * `id` - 指定した ID（`None` の場合はランダムに生成）
    /// * `now` - 作成日時
    pub async fn create(
        &self,
        id: Option<RoomId>,
        now: Timestamp,
    ) -> Result<Room, ManageRoomsError> {
        let id = match id {
            Some(id) => id,
            None => self.free_random_id().await?,
        };

        let room = Room::new(id, now);
        self.repository.create_room(&room).await?;
        tracing::info!("Room '{}' created", room.id);
        Ok(room)
    }

    /// ルームとその状態を削除する
    pub async fn remove(&self, id: &RoomId) -> Result<(), ManageRoomsError> {
        if self.repository.remove_room(id).await? {
            tracing::info!("Room '{}' removed", id);
            Ok(())
        } else {
            Err(ManageRoomsError::RoomNotFound(id.to_string()))
        }
    }

    /// ルーム一覧（新しい順）
    pub async fn list(&self) -> Result<Vec<Room>, ManageRoomsError> {
        Ok(self.repository.list_rooms().await?)
    }

    async fn free_random_id(&self) -> Result<RoomId, ManageRoomsError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = (self.id_generator)();
            if self.repository.find_room(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::debug!("Generated room id '{}' is taken, retrying", candidate);
        }
        Err(ManageRoomsError::IdSpaceExhausted(MAX_ID_ATTEMPTS))
    }
}
