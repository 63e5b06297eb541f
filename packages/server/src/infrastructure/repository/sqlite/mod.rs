//! SQLite storage for rooms and their snapshots.

mod migrations;
mod room;

pub use room::SqliteRoomRepository;

use crate::domain::RepositoryError;

impl From<rusqlite::Error> for RepositoryError {
    fn from(e: rusqlite::Error) -> Self {
        RepositoryError::Storage(e.to_string())
    }
}
