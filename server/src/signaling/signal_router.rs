use comms::event::{
    AnswerEvent, Event, IceCandidateEvent, OfferEvent, RoomMember, RoomMembersEvent,
    RoomPresenceEvent,
};
use serde_json::Value;

use super::{
    error::SignalingError,
    ids::{ConnectionId, RoomId},
    registry::{ConnectionRegistry, RoomRegistry},
};

/// Negotiation messages which are relayed point to point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    pub fn name(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
        }
    }

    fn into_event(self, payload: Value, sender: &ConnectionId, room: &RoomId) -> Event {
        let sender = String::from(sender.as_str());
        let room_id = String::from(room.as_str());

        match self {
            SignalKind::Offer => Event::Offer(OfferEvent {
                offer: payload,
                sender,
                room_id,
            }),
            SignalKind::Answer => Event::Answer(AnswerEvent {
                answer: payload,
                sender,
                room_id,
            }),
            SignalKind::IceCandidate => Event::IceCandidate(IceCandidateEvent {
                candidate: payload,
                sender,
                room_id,
            }),
        }
    }
}

/// Room scoped notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    UserJoined,
    UserLeft,
    UserStartedSharing,
    UserStoppedSharing,
    /// Membership snapshot, built from the registries at the time of sending
    RoomMembers,
}

/// [SignalRouter] decides who receives an outbound event and hands it to their outbox.
///
/// It only ever borrows the registries immutably, routing can not change membership or sharing state.
/// Delivery never waits on the receiving peer.
pub struct SignalRouter<'a> {
    connections: &'a ConnectionRegistry,
    rooms: &'a RoomRegistry,
}

impl<'a> SignalRouter<'a> {
    pub fn new(connections: &'a ConnectionRegistry, rooms: &'a RoomRegistry) -> Self {
        SignalRouter { connections, rooms }
    }

    /// Forward `payload` to `target` only, annotated with the sender and the room.
    ///
    /// The target has to be a live connection in `room`, otherwise nothing is sent
    /// and [SignalingError::TargetNotFound] is returned.
    pub fn relay(
        &self,
        kind: SignalKind,
        sender: &ConnectionId,
        target: &ConnectionId,
        room: &RoomId,
        payload: Value,
    ) -> Result<(), SignalingError> {
        if !self.rooms.is_member(room, target) {
            return Err(SignalingError::TargetNotFound(target.clone()));
        }

        let connection = self
            .connections
            .get(target)
            .map_err(|_| SignalingError::TargetNotFound(target.clone()))?;

        if connection.deliver(kind.into_event(payload, sender, room)) {
            Ok(())
        } else {
            Err(SignalingError::TargetNotFound(target.clone()))
        }
    }

    /// Send a notice about `sender` to every member of the room except the sender.
    /// Returns how many connections the notice was handed to.
    pub fn broadcast(&self, kind: NoticeKind, sender: &ConnectionId, room: &RoomId) -> usize {
        let event = self.notice(kind, sender, room);

        self.deliver_to_room(room, event, Some(sender))
    }

    /// Send a notice about `subject` to every member of the room, `subject` included
    pub fn announce(&self, kind: NoticeKind, subject: &ConnectionId, room: &RoomId) -> usize {
        let event = self.notice(kind, subject, room);

        self.deliver_to_room(room, event, None)
    }

    fn notice(&self, kind: NoticeKind, subject: &ConnectionId, room: &RoomId) -> Event {
        let presence = || RoomPresenceEvent {
            user_id: String::from(subject.as_str()),
            room_id: String::from(room.as_str()),
        };

        match kind {
            NoticeKind::UserJoined => Event::UserJoined(presence()),
            NoticeKind::UserLeft => Event::UserLeft(presence()),
            NoticeKind::UserStartedSharing => Event::UserStartedSharing(presence()),
            NoticeKind::UserStoppedSharing => Event::UserStoppedSharing(presence()),
            NoticeKind::RoomMembers => Event::RoomMembers(RoomMembersEvent {
                room_id: String::from(room.as_str()),
                members: self.members_snapshot(room),
            }),
        }
    }

    fn members_snapshot(&self, room: &RoomId) -> Vec<RoomMember> {
        self.rooms
            .members(room)
            .into_iter()
            .filter_map(|id| self.connections.get(&id).ok())
            .map(|connection| RoomMember {
                id: String::from(connection.id().as_str()),
                is_sharing: connection.is_sharing(),
            })
            .collect()
    }

    fn deliver_to_room(&self, room: &RoomId, event: Event, skip: Option<&ConnectionId>) -> usize {
        let mut delivered = 0;

        for member in self.rooms.members(room) {
            if skip == Some(&member) {
                continue;
            }

            match self.connections.get(&member) {
                Ok(connection) if connection.deliver(event.clone()) => delivered += 1,
                Ok(_) => {
                    tracing::trace!(connection_id = %member, room_id = %room, "outbox closed, event dropped");
                }
                Err(_) => {
                    tracing::error!(connection_id = %member, room_id = %room, "room member is not a registered connection");
                }
            }
        }

        delivered
    }
}
