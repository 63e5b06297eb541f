//! In-memory cache of active room runtimes.
//!
//! A runtime exists while at least one socket is connected to its room. It is
//! created from storage on first connect and dropped when the last socket
//! leaves; storage already holds every accepted version at that point.
//!
//! All runtime mutations go through [`RoomRuntimeCache::lock`], which hands
//! out an exclusive guard for one room. Holding the guard across reduce,
//! persist and broadcast keeps each room's actions strictly ordered and makes
//! broadcasts carry exactly the persisted version. Guards for different rooms
//! never wait on each other.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex as StdMutex, MutexGuard as StdMutexGuard, PoisonError},
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    entity::RoomSnapshot,
    room_state::RoomState,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// Live state of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRuntime {
    pub version: u64,
    pub state: RoomState,
    pub connections: HashSet<ConnectionId>,
}

impl RoomRuntime {
    /// Runtime with no connected sockets.
    pub fn new(version: u64, state: RoomState) -> Self {
        Self {
            version,
            state,
            connections: HashSet::new(),
        }
    }

    /// Snapshot of the current state as seen at `server_now`.
    pub fn snapshot(&self, room_id: &RoomId, server_now: Timestamp) -> RoomSnapshot {
        RoomSnapshot {
            room_id: room_id.clone(),
            version: self.version,
            server_now,
            state: self.state.clone(),
        }
    }

    /// Connected sockets, as broadcast targets.
    pub fn targets(&self) -> Vec<ConnectionId> {
        self.connections.iter().copied().collect()
    }
}

/// Per-room lock; `None` while no runtime is loaded.
type RoomSlot = Arc<Mutex<Option<RoomRuntime>>>;

/// Cache service keyed by room id.
///
/// The slot map is only touched for short, non-async sections; the per-room
/// slot lock is the one held across `.await`.
#[derive(Debug, Default)]
pub struct RoomRuntimeCache {
    slots: StdMutex<HashMap<RoomId, RoomSlot>>,
}

impl RoomRuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to one room's runtime.
    pub async fn lock(&self, room_id: &RoomId) -> RoomRuntimeGuard<'_> {
        loop {
            let slot = self.slots().entry(room_id.clone()).or_default().clone();
            let runtime = slot.clone().lock_owned().await;

            // The slot may have been retired while this task was waiting.
            let current = self
                .slots()
                .get(room_id)
                .is_some_and(|live| Arc::ptr_eq(live, &slot));
            if current {
                return RoomRuntimeGuard {
                    cache: self,
                    room_id: room_id.clone(),
                    slot,
                    runtime,
                };
            }
        }
    }

    /// Number of sockets connected to a room (0 when not loaded).
    pub async fn connection_count(&self, room_id: &RoomId) -> usize {
        self.lock(room_id)
            .await
            .get()
            .map_or(0, |runtime| runtime.connections.len())
    }

    /// Whether a runtime is currently loaded for the room.
    pub async fn is_loaded(&self, room_id: &RoomId) -> bool {
        self.lock(room_id).await.get().is_some()
    }

    fn slots(&self) -> StdMutexGuard<'_, HashMap<RoomId, RoomSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop an empty slot, unless it has already been replaced.
    fn retire(&self, room_id: &RoomId, slot: &RoomSlot) {
        let mut slots = self.slots();
        if slots.get(room_id).is_some_and(|live| Arc::ptr_eq(live, slot)) {
            slots.remove(room_id);
        }
    }
}

/// Exclusive view over one room's runtime.
pub struct RoomRuntimeGuard<'a> {
    cache: &'a RoomRuntimeCache,
    room_id: RoomId,
    slot: RoomSlot,
    runtime: OwnedMutexGuard<Option<RoomRuntime>>,
}

impl RoomRuntimeGuard<'_> {
    pub fn get(&self) -> Option<&RoomRuntime> {
        self.runtime.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut RoomRuntime> {
        self.runtime.as_mut()
    }

    /// Insert a runtime unless one is already loaded; returns the cached one.
    pub fn get_or_insert(&mut self, runtime: RoomRuntime) -> &mut RoomRuntime {
        self.runtime.get_or_insert(runtime)
    }

    /// Remove a socket. Drops the runtime once its socket set is empty.
    ///
    /// Returns `true` when the runtime was evicted.
    pub fn detach(&mut self, connection_id: &ConnectionId) -> bool {
        let Some(runtime) = self.runtime.as_mut() else {
            return false;
        };
        runtime.connections.remove(connection_id);
        if runtime.connections.is_empty() {
            *self.runtime = None;
            return true;
        }
        false
    }
}

impl Drop for RoomRuntimeGuard<'_> {
    fn drop(&mut self) {
        // Still holding the slot lock, so waiters re-resolve after retirement.
        if self.runtime.is_none() {
            self.cache.retire(&self.room_id, &self.slot);
        }
    }
}
