//! Room registry
//!
//! Process-wide id -> room table. `RoomRegistry` is a cheap cloneable
//! handle around the shared table - store it in the router state, never in
//! a static. Room lifetime is reference counted: `get_or_create` hands out
//! a `RoomGuard`, and dropping the last guard unlinks the room from the
//! table.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::room::{Room, Subscription};
use crate::types::RoomId;

/// The process-wide room table (cloneable handle)
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomId, Arc<Room>>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a reference-counted handle to the room for `id`, creating and
    /// registering an empty one if needed
    ///
    /// Safe under arbitrary concurrency: two callers racing on the same id
    /// end up holding the same room, and a caller racing a teardown retries
    /// until it finds (or creates) a live one. Creation cannot fail.
    pub fn get_or_create(&self, id: RoomId) -> RoomGuard {
        loop {
            let room = {
                let mut rooms = self.rooms.lock().unwrap();
                rooms
                    .entry(id)
                    .or_insert_with(|| {
                        info!("room {} created", id);
                        Arc::new(Room::new(id))
                    })
                    .clone()
            };

            // The map lock is released before taking membership, so the
            // teardown path (membership -> map) cannot deadlock with us.
            let mut membership = room.membership.lock().unwrap();
            if membership.closed {
                // Tombstone: the last guard is unlinking this room and
                // holds the membership lock across the removal, so by the
                // time we observed `closed` the map entry is already gone.
                drop(membership);
                debug!("room {}: lost race with teardown, retrying", id);
                continue;
            }
            membership.count += 1;
            drop(membership);

            return RoomGuard {
                registry: self.clone(),
                room,
            };
        }
    }

    /// Look up a room without taking a reference
    ///
    /// Used by the one-shot publish endpoints: an action aimed at an absent
    /// room is dropped rather than conjuring a room nobody is watching.
    pub fn find(&self, id: RoomId) -> Option<Arc<Room>> {
        self.rooms.lock().unwrap().get(&id).cloned()
    }

    /// Point-in-time listing of (room id, member count), ordered by id
    ///
    /// Collects the rooms first and reads each count afterwards so the map
    /// lock is never held while taking a membership lock.
    pub fn snapshot(&self) -> Vec<(RoomId, usize)> {
        let rooms: Vec<Arc<Room>> = self.rooms.lock().unwrap().values().cloned().collect();
        let mut listing: Vec<(RoomId, usize)> = rooms
            .iter()
            .map(|room| (room.id(), room.member_count()))
            .collect();
        listing.sort_by_key(|&(id, _)| id);
        listing
    }

    /// Number of live rooms
    pub fn room_count(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }

    fn release(&self, room: &Arc<Room>) {
        let mut membership = room.membership.lock().unwrap();
        membership.count -= 1;
        if membership.count == 0 {
            membership.closed = true;
            // Unlink while still holding the membership lock: once another
            // caller can observe `closed`, the entry is already gone.
            self.rooms.lock().unwrap().remove(&room.id());
            info!("room {} destroyed (last member left)", room.id());
        }
    }
}

/// A counted reference to a room
///
/// Holds the room alive in the registry; dropping the guard releases the
/// reference and tears the room down when the count reaches zero. Derefs
/// to `Room`, so holders publish through the guard directly.
#[derive(Debug)]
pub struct RoomGuard {
    registry: RoomRegistry,
    room: Arc<Room>,
}

impl RoomGuard {
    /// Register in the room's subscriber set
    pub fn subscribe(&self) -> Subscription {
        Arc::clone(&self.room).subscribe()
    }
}

impl Deref for RoomGuard {
    type Target = Room;

    fn deref(&self) -> &Room {
        &self.room
    }
}

impl Drop for RoomGuard {
    fn drop(&mut self) {
        self.registry.release(&self.room);
    }
}
