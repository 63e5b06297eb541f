//! UseCase 層
//!
//! ドメインの操作（リデューサ、リポジトリ、MessagePusher、ランタイムキャッシュ）を
//! 組み合わせてアプリケーションの処理単位を提供します。

pub mod apply_action;
pub mod connect_client;
pub mod disconnect_client;
pub mod error;
pub mod get_room_detail;
pub mod manage_rooms;
pub mod send_error;

pub use apply_action::ApplyActionUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{ApplyActionError, ConnectError, GetRoomDetailError, ManageRoomsError};
pub use get_room_detail::{GetRoomDetailUseCase, RoomDetail};
pub use manage_rooms::ManageRoomsUseCase;
pub use send_error::SendErrorUseCase;

#[cfg(test)]
pub(crate) mod test_support;
