//! Infrastructure layer: wire DTOs, SQLite persistence, WebSocket delivery.

pub mod dto;
pub mod message_pusher;
pub mod repository;
