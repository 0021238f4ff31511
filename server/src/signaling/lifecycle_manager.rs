use std::collections::BTreeSet;

use comms::command::UserCommand;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{
    error::SignalingError,
    ids::{ConnectionId, RoomId},
    registry::{ConnectionRegistry, Outbox, PeerState, RoomRegistry},
    signal_router::{NoticeKind, SignalKind, SignalRouter},
};

/// Both registries live behind one lock, every command is applied to them as a whole
#[derive(Debug, Default)]
struct SignalingState {
    connections: ConnectionRegistry,
    rooms: RoomRegistry,
}

/// [LifecycleManager] drives every connection through its lifecycle:
/// unjoined, joined to a room, sharing in a room, and finally disconnected.
///
/// Each call takes the lock once and does all of its registry reads, mutations and
/// outbound routing before releasing it. No other call observes a half applied join or leave.
#[derive(Debug, Default)]
pub struct LifecycleManager {
    state: Mutex<SignalingState>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        LifecycleManager::default()
    }

    /// Register a freshly accepted connection, events for it will be pushed to `outbox`
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) -> Result<(), SignalingError> {
        let mut state = self.state.lock().await;

        state.connections.register(id.clone(), outbox)?;
        tracing::info!(connection_id = %id, "connection registered");

        Ok(())
    }

    /// Apply a single command sent by `id`.
    ///
    /// A command which is not allowed in the connection's current state returns
    /// [SignalingError::Protocol] and changes nothing.
    pub async fn handle_command(
        &self,
        id: &ConnectionId,
        command: UserCommand,
    ) -> Result<(), SignalingError> {
        let mut state = self.state.lock().await;

        match command {
            UserCommand::JoinRoom(cmd) => state.join_room(id, RoomId::from(cmd.room_id)),
            UserCommand::LeaveRoom => state.leave_room(id).map(|_| ()),
            UserCommand::StartSharing => state.start_sharing(id),
            UserCommand::StopSharing => state.stop_sharing(id),
            UserCommand::Offer(cmd) => state.relay(id, SignalKind::Offer, cmd.target, cmd.offer),
            UserCommand::Answer(cmd) => state.relay(id, SignalKind::Answer, cmd.target, cmd.answer),
            UserCommand::IceCandidate(cmd) => {
                state.relay(id, SignalKind::IceCandidate, cmd.target, cmd.candidate)
            }
        }
    }

    /// Tear down a connection whatever state it is in.
    /// The rest of its room is told it left. Disconnecting an unknown connection does nothing.
    pub async fn disconnect(&self, id: &ConnectionId) {
        let mut state = self.state.lock().await;

        if state.disconnect(id) {
            tracing::info!(connection_id = %id, "connection removed");
        }
    }

    pub async fn room_exists(&self, room: &RoomId) -> bool {
        self.state.lock().await.rooms.exists(room)
    }

    pub async fn room_members(&self, room: &RoomId) -> BTreeSet<ConnectionId> {
        self.state.lock().await.rooms.members(room)
    }

    pub async fn connection_state(&self, id: &ConnectionId) -> Option<PeerState> {
        let state = self.state.lock().await;

        state
            .connections
            .get(id)
            .ok()
            .map(|connection| connection.state().clone())
    }

    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connections.len()
    }

    /// Panics if room memberships and connection room pointers disagree
    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        self.state.lock().await.assert_consistent();
    }
}

impl SignalingState {
    fn router(&self) -> SignalRouter<'_> {
        SignalRouter::new(&self.connections, &self.rooms)
    }

    fn peer_state(&self, id: &ConnectionId) -> Result<PeerState, SignalingError> {
        Ok(self.connections.get(id)?.state().clone())
    }

    fn join_room(&mut self, id: &ConnectionId, room: RoomId) -> Result<(), SignalingError> {
        let current = self.peer_state(id)?;

        // joining the room we are already in keeps membership and sharing as they are
        if current.room() != Some(&room) {
            if current.room().is_some() {
                self.leave_room(id)?;
            }

            self.rooms.join(&room, id);
            self.connections.set_room(id, Some(room.clone()))?;
            tracing::info!(connection_id = %id, room_id = %room, "joined room");
        }

        let router = self.router();
        router.announce(NoticeKind::UserJoined, id, &room);
        router.announce(NoticeKind::RoomMembers, id, &room);

        Ok(())
    }

    fn leave_room(&mut self, id: &ConnectionId) -> Result<RoomId, SignalingError> {
        let current = self.peer_state(id)?;
        let Some(room) = current.room().cloned() else {
            return Err(SignalingError::protocol("leave-room", &current));
        };

        self.router().broadcast(NoticeKind::UserLeft, id, &room);
        self.connections.set_room(id, None)?;

        if self.rooms.leave(&room, id) {
            tracing::debug!(room_id = %room, "room is empty, deleted");
        }
        tracing::info!(connection_id = %id, room_id = %room, "left room");

        Ok(room)
    }

    fn start_sharing(&mut self, id: &ConnectionId) -> Result<(), SignalingError> {
        let room = match self.peer_state(id)? {
            PeerState::Joined(room) => room,
            other => return Err(SignalingError::protocol("start-sharing", &other)),
        };

        self.connections.set_sharing(id, true)?;
        self.router().broadcast(NoticeKind::UserStartedSharing, id, &room);
        tracing::info!(connection_id = %id, room_id = %room, "started sharing");

        Ok(())
    }

    fn stop_sharing(&mut self, id: &ConnectionId) -> Result<(), SignalingError> {
        let room = match self.peer_state(id)? {
            PeerState::Sharing(room) => room,
            other => return Err(SignalingError::protocol("stop-sharing", &other)),
        };

        self.connections.set_sharing(id, false)?;
        self.router().broadcast(NoticeKind::UserStoppedSharing, id, &room);
        tracing::info!(connection_id = %id, room_id = %room, "stopped sharing");

        Ok(())
    }

    fn relay(
        &self,
        id: &ConnectionId,
        kind: SignalKind,
        target: String,
        payload: Value,
    ) -> Result<(), SignalingError> {
        let current = self.peer_state(id)?;
        let Some(room) = current.room() else {
            return Err(SignalingError::protocol(kind.name(), &current));
        };
        let target = ConnectionId::from(target);

        match self.router().relay(kind, id, &target, room, payload) {
            Ok(()) => {
                tracing::debug!(connection_id = %id, target = %target, room_id = %room, "{} relayed", kind.name());
            }
            // best effort, the sender is never told about a missing target
            Err(SignalingError::TargetNotFound(_)) => {
                tracing::debug!(
                    connection_id = %id, target = %target, room_id = %room,
                    "{} dropped, target not in room", kind.name()
                );
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    fn disconnect(&mut self, id: &ConnectionId) -> bool {
        let Ok(connection) = self.connections.get(id) else {
            return false;
        };

        if let Some(room) = connection.room() {
            self.router().broadcast(NoticeKind::UserLeft, id, room);
        }

        // membership follows the room the registry held for the connection
        if let Some(room) = self.connections.remove(id) {
            if self.rooms.leave(&room, id) {
                tracing::debug!(room_id = %room, "room is empty, deleted");
            }
        }

        true
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for room in self.rooms.room_ids() {
            let members = self.rooms.members(room);
            let pointing_at_room: BTreeSet<ConnectionId> = self
                .connections
                .iter()
                .filter(|connection| connection.room() == Some(room))
                .map(|connection| connection.id().clone())
                .collect();

            assert!(!members.is_empty(), "room '{}' is empty", room);
            assert_eq!(members, pointing_at_room, "room '{}' disagrees", room);
        }

        for connection in self.connections.iter() {
            if let Some(room) = connection.room() {
                assert!(
                    self.rooms.is_member(room, connection.id()),
                    "'{}' points at '{}' which does not list it",
                    connection.id(),
                    room
                );
            }
        }
    }
}
