//! SQLite Room Repository implementation.
//!
//! One `rusqlite::Connection` behind a mutex. Statements are short single-row
//! reads and upserts, so they run inline on the calling task.

use std::{path::Path, sync::Mutex};

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params, types::Type};
use tracing::instrument;

use crate::domain::{
    RepositoryError, Room, RoomId, RoomRepository, RoomState, StoredSnapshot, Timestamp,
};

use super::migrations;

/// SQLite-backed room store.
pub struct SqliteRoomRepository {
    conn: Mutex<Connection>,
}

impl SqliteRoomRepository {
    /// Open or create the database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, RepositoryError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| RepositoryError::Storage("connection mutex poisoned".to_string()))?;
        f(&conn)
    }
}

fn room_from_row(row: &Row<'_>) -> rusqlite::Result<Room> {
    let id: String = row.get(0)?;
    let id = RoomId::new(id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    Ok(Room {
        id,
        created_at: Timestamp::new(row.get(1)?),
        enabled: row.get::<_, i64>(2)? != 0,
    })
}

fn version_to_sql(version: u64) -> Result<i64, RepositoryError> {
    i64::try_from(version)
        .map_err(|_| RepositoryError::Storage(format!("version {} out of range", version)))
}

#[async_trait]
impl RoomRepository for SqliteRoomRepository {
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, RepositoryError> {
        self.with_conn(|conn| {
            let room = conn
                .query_row(
                    "SELECT id, created_at, enabled FROM rooms WHERE id = ?1",
                    params![room_id.as_str()],
                    room_from_row,
                )
                .optional()?;
            Ok(room)
        })
    }

    async fn is_room_enabled(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM rooms WHERE id = ?1 AND enabled = 1",
                    params![room_id.as_str()],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    async fn load_snapshot(
        &self,
        room_id: &RoomId,
    ) -> Result<Option<StoredSnapshot>, RepositoryError> {
        let row = self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT version, state_json, updated_at FROM room_state WHERE room_id = ?1",
                    params![room_id.as_str()],
                    |row| {
                        Ok((
                            row.get::<_, i64>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })?;

        let Some((version, state_json, updated_at)) = row else {
            return Ok(None);
        };

        let version = match u64::try_from(version) {
            Ok(version) => version,
            Err(_) => {
                tracing::warn!(
                    "Room '{}' has negative version {}, falling back to defaults",
                    room_id,
                    version
                );
                return Ok(None);
            }
        };

        match serde_json::from_str::<RoomState>(&state_json) {
            Ok(state) => Ok(Some(StoredSnapshot {
                version,
                state,
                updated_at: Timestamp::new(updated_at),
            })),
            Err(e) => {
                tracing::warn!(
                    "Room '{}' has corrupt state_json ({}), falling back to defaults",
                    room_id,
                    e
                );
                Ok(None)
            }
        }
    }

    async fn save_snapshot(
        &self,
        room_id: &RoomId,
        version: u64,
        state: &RoomState,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let state_json = serde_json::to_string(state)?;
        let version = version_to_sql(version)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO room_state (room_id, version, state_json, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(room_id) DO UPDATE SET
                    version = excluded.version,
                    state_json = excluded.state_json,
                    updated_at = excluded.updated_at",
                params![room_id.as_str(), version, state_json, updated_at.value()],
            )?;
            Ok(())
        })
    }

    async fn create_room(&self, room: &Room) -> Result<(), RepositoryError> {
        self.with_conn(|conn| {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM rooms WHERE id = ?1",
                    params![room.id.as_str()],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                return Err(RepositoryError::RoomAlreadyExists(room.id.to_string()));
            }

            conn.execute(
                "INSERT INTO rooms (id, created_at, enabled) VALUES (?1, ?2, ?3)",
                params![
                    room.id.as_str(),
                    room.created_at.value(),
                    i64::from(room.enabled)
                ],
            )?;
            Ok(())
        })
    }

    async fn remove_room(&self, room_id: &RoomId) -> Result<bool, RepositoryError> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM room_state WHERE room_id = ?1",
                params![room_id.as_str()],
            )?;
            let deleted = conn.execute("DELETE FROM rooms WHERE id = ?1", params![room_id.as_str()])?;
            Ok(deleted > 0)
        })
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, created_at, enabled FROM rooms ORDER BY created_at DESC, id ASC",
            )?;
            let rooms = stmt
                .query_map([], room_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rooms)
        })
    }
}
