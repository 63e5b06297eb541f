//! Domain layer: value objects, room state, reducer and the interfaces the
//! use cases depend on.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod reducer;
pub mod repository;
pub mod room_state;
pub mod runtime;
pub mod value_object;

pub use entity::{Room, RoomSnapshot, StoredSnapshot, SyncError, SyncErrorCode};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use reducer::{Action, elapsed_ms, maybe_auto_finish, next_session_after, reduce, remaining_ms};
pub use repository::RoomRepository;
#[cfg(test)]
pub use repository::MockRoomRepository;
pub use room_state::{PomodoroConfig, PomodoroMode, PomodoroState, RoomState, SessionType};
pub use runtime::{RoomRuntime, RoomRuntimeCache, RoomRuntimeGuard};
pub use value_object::{ClientId, ConnectionId, RoomId, RoomIdFactory, Timestamp};
