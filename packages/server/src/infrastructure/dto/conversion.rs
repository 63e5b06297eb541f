//! Conversion logic between DTOs and domain entities.

use crate::domain::{ClientId, RoomSnapshot, SyncError};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// DTO → Domain
// ========================================

impl dto::HelloMessage {
    /// Announced client id, if it is a valid one.
    pub fn client_id(&self) -> Option<ClientId> {
        ClientId::new(self.client_id.clone()).ok()
    }
}

impl dto::ActionMessage {
    /// Announced client id, if it is a valid one.
    pub fn client_id(&self) -> Option<ClientId> {
        ClientId::new(self.client_id.clone()).ok()
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&RoomSnapshot> for dto::StateMessage {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            r#type: dto::MessageType::State,
            room_id: snapshot.room_id.as_str().to_string(),
            version: snapshot.version,
            server_now_ms: snapshot.server_now.value(),
            state: snapshot.state.clone(),
        }
    }
}

impl From<&SyncError> for dto::ErrorMessage {
    fn from(error: &SyncError) -> Self {
        Self {
            r#type: dto::MessageType::Error,
            code: error.code.as_str().to_string(),
            message: error.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RoomId, RoomState, SyncErrorCode, Timestamp};

    #[test]
    fn test_announced_client_id() {
        // テスト項目: 有効な clientId のみ ClientId に変換される
        // given (前提条件):
        let hello = |client_id: &str| dto::HelloMessage {
            r#type: dto::MessageType::Hello,
            room_id: "12345678".to_string(),
            client_id: client_id.to_string(),
        };
        let action = dto::ActionMessage {
            r#type: dto::MessageType::Action,
            room_id: "12345678".to_string(),
            client_id: "bob".to_string(),
            action: crate::domain::Action::PomoStart,
        };

        // when (操作) / then (期待する結果):
        assert_eq!(
            hello("alice").client_id(),
            Some(ClientId::new("alice".to_string()).unwrap())
        );
        assert_eq!(hello("").client_id(), None);
        assert_eq!(hello(&"x".repeat(65)).client_id(), None);
        assert_eq!(
            action.client_id().as_ref().map(ClientId::as_str),
            Some("bob")
        );
    }

    #[test]
    fn test_domain_snapshot_to_dto() {
        // テスト項目: ドメインのスナップショットが state フレームに変換される
        // given (前提条件):
        let snapshot = RoomSnapshot {
            room_id: RoomId::new("87654321".to_string()).unwrap(),
            version: 12,
            server_now: Timestamp::new(5000),
            state: RoomState::default(),
        };

        // when (操作):
        let dto_msg = dto::StateMessage::from(&snapshot);

        // then (期待する結果):
        assert_eq!(dto_msg.r#type, dto::MessageType::State);
        assert_eq!(dto_msg.room_id, "87654321");
        assert_eq!(dto_msg.version, 12);
        assert_eq!(dto_msg.server_now_ms, 5000);
        assert_eq!(dto_msg.state, snapshot.state);
    }

    #[test]
    fn test_domain_error_to_dto() {
        // テスト項目: ドメインのエラーが error フレームに変換される
        // given (前提条件):
        let errors = [
            (SyncError::room_not_loaded(), "ROOM_NOT_LOADED"),
            (SyncError::bad_json(), "BAD_JSON"),
            (SyncError::unknown_msg(), "UNKNOWN_MSG"),
            (SyncError::storage_error(), "STORAGE_ERROR"),
        ];

        for (error, expected_code) in errors {
            // when (操作):
            let dto_msg = dto::ErrorMessage::from(&error);

            // then (期待する結果):
            assert_eq!(dto_msg.r#type, dto::MessageType::Error);
            assert_eq!(dto_msg.code, expected_code);
            assert_eq!(dto_msg.message, error.message);
        }
        assert_eq!(SyncErrorCode::BadJson.as_str(), "BAD_JSON");
    }
}
