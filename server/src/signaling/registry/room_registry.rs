use std::collections::{BTreeSet, HashMap, HashSet};

use crate::signaling::ids::{ConnectionId, RoomId};

#[derive(Debug, Default)]
pub struct RoomRegistry {
    room_to_members: HashMap<RoomId, HashSet<ConnectionId>>,
}

/// [RoomRegistry] is a smart container for keeping track of which connections are in which room
///
/// Rooms are not declared up front, a room exists exactly as long as it has at least one member
impl RoomRegistry {
    pub fn new() -> Self {
        RoomRegistry {
            room_to_members: HashMap::new(),
        }
    }

    /// Add a connection to the room, creating the room if needed.
    /// Returns true if the connection was not a member before
    pub fn join(&mut self, room: &RoomId, connection_id: &ConnectionId) -> bool {
        self.room_to_members
            .entry(room.clone())
            .or_default()
            .insert(connection_id.clone())
    }

    /// Removes a connection from the room, returns true if the room got deleted because it became empty
    /// Does nothing and returns false if the room does not exist
    pub fn leave(&mut self, room: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(members) = self.room_to_members.get_mut(room) else {
            return false;
        };

        members.remove(connection_id);

        if members.is_empty() {
            self.room_to_members.remove(room);

            true
        } else {
            false
        }
    }

    /// Current members of the room, empty for a room that does not exist
    pub fn members(&self, room: &RoomId) -> BTreeSet<ConnectionId> {
        self.room_to_members
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room: &RoomId, connection_id: &ConnectionId) -> bool {
        self.room_to_members
            .get(room)
            .is_some_and(|members| members.contains(connection_id))
    }

    pub fn exists(&self, room: &RoomId) -> bool {
        self.room_to_members.contains_key(room)
    }

    pub fn room_ids(&self) -> impl Iterator<Item = &RoomId> {
        self.room_to_members.keys()
    }
}
