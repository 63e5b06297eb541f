//! Repository implementations.

pub mod sqlite;

pub use sqlite::SqliteRoomRepository;
