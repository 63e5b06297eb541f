//! HTTP API response DTOs.

use serde::Serialize;

/// Room detail returned by `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub enabled: bool,
    pub created_at: String,
    pub version: u64,
    pub updated_at: Option<String>,
    pub connected_clients: usize,
}
