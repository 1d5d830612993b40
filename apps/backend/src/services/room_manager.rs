//! Arena of live rooms.
//!
//! Rooms are referenced by id only. Each sits behind its own mutex, so
//! commands for one room are applied one at a time while different rooms run
//! in parallel. The map guard is never held while a room lock is taken.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info};

use super::room::{Room, RoomSettings};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::protocol::{OutboundEvent, RoomId, RoomStatus};

pub type SharedRoom = Arc<Mutex<Room>>;

pub struct RoomManager {
    rooms: DashMap<RoomId, SharedRoom>,
    next_id: AtomicI64,
    settings: RoomSettings,
}

impl RoomManager {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            rooms: DashMap::new(),
            next_id: AtomicI64::new(1),
            settings,
        }
    }

    /// Create an empty room with a random base seed.
    pub fn create_room(&self) -> RoomId {
        self.create_room_with_seed(rand::rng().random())
    }

    /// Create an empty room whose deals all derive from `seed`.
    pub fn create_room_with_seed(&self, seed: u64) -> RoomId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.rooms
            .insert(id, Arc::new(Mutex::new(Room::new(id, seed, self.settings))));
        info!(room_id = id, "[ROOM MANAGER] room created");
        id
    }

    pub fn get(&self, room_id: RoomId) -> Option<SharedRoom> {
        self.rooms.get(&room_id).map(|entry| entry.value().clone())
    }

    pub fn require(&self, room_id: RoomId) -> Result<SharedRoom, DomainError> {
        self.get(room_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Room, format!("Room {room_id} not found"))
        })
    }

    /// Run `f` with exclusive access to one room.
    pub fn with_room<T>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut Room) -> T,
    ) -> Result<T, DomainError> {
        let room = self.require(room_id)?;
        let mut guard = room.lock();
        Ok(f(&mut guard))
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Drop the room when nobody sits in it and no game is running. The room
    /// is closed under its own lock, so a caller still holding the `Arc` sees
    /// it gone.
    pub fn remove_if_empty(&self, room_id: RoomId) -> bool {
        let removed = self
            .rooms
            .remove_if(&room_id, |_, room| {
                room.try_lock().is_some_and(|mut r| {
                    let idle = r.is_empty() && r.status() != RoomStatus::Playing;
                    if idle {
                        r.close();
                    }
                    idle
                })
            })
            .is_some();
        if removed {
            info!(room_id, "[ROOM MANAGER] empty room destroyed");
        }
        removed
    }

    /// Fire due timers in every room.
    pub fn tick(&self, now: Instant) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        for room_id in self.room_ids() {
            let Some(room) = self.get(room_id) else {
                continue;
            };
            let (fired, vacated) = {
                let mut guard = room.lock();
                let fired = guard.expire_timers(now);
                (fired, guard.is_empty() && guard.has_hosted())
            };
            if !fired.is_empty() {
                debug!(room_id, count = fired.len(), "[ROOM MANAGER] timers fired");
                events.extend(fired);
            }
            // A room nobody has joined yet is left for its creator.
            if vacated {
                self.remove_if_empty(room_id);
            }
        }
        events
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomSettings::default())
    }
}
