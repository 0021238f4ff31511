use std::{collections::HashMap, fmt};

use comms::event::Event;
use tokio::sync::mpsc;

use crate::signaling::{
    error::SignalingError,
    ids::{ConnectionId, RoomId},
};

/// Channel feeding events to the session that owns a connection.
/// Unbounded so that routing never waits on a slow peer.
pub type Outbox = mpsc::UnboundedSender<Event>;

/// Where a connection stands in its lifecycle.
///
/// A connection that is gone is simply absent from the [ConnectionRegistry].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerState {
    Unjoined,
    Joined(RoomId),
    Sharing(RoomId),
}

impl PeerState {
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            PeerState::Unjoined => None,
            PeerState::Joined(room) | PeerState::Sharing(room) => Some(room),
        }
    }

    pub fn is_sharing(&self) -> bool {
        matches!(self, PeerState::Sharing(_))
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerState::Unjoined => write!(f, "not in a room"),
            PeerState::Joined(room) => write!(f, "joined to room '{}'", room),
            PeerState::Sharing(room) => write!(f, "sharing in room '{}'", room),
        }
    }
}

#[derive(Debug)]
/// [Connection] is the server side view of a single live transport session
pub struct Connection {
    id: ConnectionId,
    state: PeerState,
    outbox: Outbox,
}

impl Connection {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> &PeerState {
        &self.state
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.state.room()
    }

    pub fn is_sharing(&self) -> bool {
        self.state.is_sharing()
    }

    /// Queue an event for the connection, returns false if its session is already gone
    pub(crate) fn deliver(&self, event: Event) -> bool {
        self.outbox.send(event).is_ok()
    }
}

/// [ConnectionRegistry] keeps track of every live connection, the room it is in and whether it is sharing
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry {
            connections: HashMap::new(),
        }
    }

    /// Add a fresh connection which is not in any room and not sharing
    pub fn register(&mut self, id: ConnectionId, outbox: Outbox) -> Result<(), SignalingError> {
        if self.connections.contains_key(&id) {
            return Err(SignalingError::AlreadyRegistered(id));
        }

        self.connections.insert(
            id.clone(),
            Connection {
                id,
                state: PeerState::Unjoined,
                outbox,
            },
        );

        Ok(())
    }

    pub fn get(&self, id: &ConnectionId) -> Result<&Connection, SignalingError> {
        self.connections
            .get(id)
            .ok_or_else(|| SignalingError::ConnectionNotFound(id.clone()))
    }

    /// Point the connection at a room, or at no room at all. Sharing is always reset.
    pub fn set_room(&mut self, id: &ConnectionId, room: Option<RoomId>) -> Result<(), SignalingError> {
        let connection = self.get_mut(id)?;

        connection.state = match room {
            Some(room) => PeerState::Joined(room),
            None => PeerState::Unjoined,
        };

        Ok(())
    }

    /// Flip the sharing flag, only possible while the connection is in a room
    pub fn set_sharing(&mut self, id: &ConnectionId, sharing: bool) -> Result<(), SignalingError> {
        let connection = self.get_mut(id)?;

        let room = match connection.state.room() {
            Some(room) => room.clone(),
            None => {
                let command = if sharing { "start-sharing" } else { "stop-sharing" };
                return Err(SignalingError::protocol(command, &connection.state));
            }
        };

        connection.state = if sharing {
            PeerState::Sharing(room)
        } else {
            PeerState::Joined(room)
        };

        Ok(())
    }

    /// Drop the connection and hand back the room it was in, if any.
    /// Removing an unknown connection does nothing.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<RoomId> {
        self.connections
            .remove(id)
            .and_then(|connection| match connection.state {
                PeerState::Unjoined => None,
                PeerState::Joined(room) | PeerState::Sharing(room) => Some(room),
            })
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    fn get_mut(&mut self, id: &ConnectionId) -> Result<&mut Connection, SignalingError> {
        self.connections
            .get_mut(id)
            .ok_or_else(|| SignalingError::ConnectionNotFound(id.clone()))
    }
}
