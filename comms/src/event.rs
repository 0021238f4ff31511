use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sent to a single connection right after the server accepted it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEstablishedEvent {
    /// The connection id assigned by the server, used by other peers as a relay target
    pub id: String,
}

/// A user has joined, left, started or stopped sharing in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomPresenceEvent {
    /// The connection id of the user the event is about
    #[serde(rename = "userId")]
    pub user_id: String,
    /// The room the event happened in
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// A single entry of a room membership snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMember {
    pub id: String,
    #[serde(rename = "isSharing")]
    pub is_sharing: bool,
}

/// Full membership snapshot of a room, sent to every member after a join
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomMembersEvent {
    #[serde(rename = "roomId")]
    pub room_id: String,
    pub members: Vec<RoomMember>,
}

/// A session description offer relayed from `sender`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEvent {
    pub offer: Value,
    pub sender: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// A session description answer relayed from `sender`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub answer: Value,
    pub sender: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// A connectivity candidate relayed from `sender`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidateEvent {
    pub candidate: Value,
    pub sender: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "kebab-case")]
/// Events that can be sent to the client
/// Events maybe related to different users of the same room, the receipient is a single connection
pub enum Event {
    ConnectionEstablished(ConnectionEstablishedEvent),
    UserJoined(RoomPresenceEvent),
    UserLeft(RoomPresenceEvent),
    UserStartedSharing(RoomPresenceEvent),
    UserStoppedSharing(RoomPresenceEvent),
    RoomMembers(RoomMembersEvent),
    Offer(OfferEvent),
    Answer(AnswerEvent),
    IceCandidate(IceCandidateEvent),
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // given an event enum, and an expect string, asserts that event is serialized / deserialized appropiately
    fn assert_event_serialization(event: &Event, expected: &str) {
        let serialized = serde_json::to_string(&event).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: Event = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *event);
    }

    #[test]
    fn test_user_joined_event() {
        let event = Event::UserJoined(RoomPresenceEvent {
            user_id: "b".to_string(),
            room_id: "demo".to_string(),
        });

        assert_event_serialization(&event, r#"{"t":"user-joined","userId":"b","roomId":"demo"}"#);
    }

    #[test]
    fn test_user_started_sharing_event() {
        let event = Event::UserStartedSharing(RoomPresenceEvent {
            user_id: "a".to_string(),
            room_id: "demo".to_string(),
        });

        assert_event_serialization(
            &event,
            r#"{"t":"user-started-sharing","userId":"a","roomId":"demo"}"#,
        );
    }

    #[test]
    fn test_room_members_event() {
        let event = Event::RoomMembers(RoomMembersEvent {
            room_id: "demo".to_string(),
            members: vec![
                RoomMember {
                    id: "a".to_string(),
                    is_sharing: true,
                },
                RoomMember {
                    id: "b".to_string(),
                    is_sharing: false,
                },
            ],
        });

        assert_event_serialization(
            &event,
            r#"{"t":"room-members","roomId":"demo","members":[{"id":"a","isSharing":true},{"id":"b","isSharing":false}]}"#,
        );
    }

    #[test]
    fn test_offer_event() {
        let event = Event::Offer(OfferEvent {
            offer: json!("X"),
            sender: "a".to_string(),
            room_id: "demo".to_string(),
        });

        assert_event_serialization(
            &event,
            r#"{"t":"offer","offer":"X","sender":"a","roomId":"demo"}"#,
        );
    }

    #[test]
    fn test_connection_established_event() {
        let event = Event::ConnectionEstablished(ConnectionEstablishedEvent {
            id: "a".to_string(),
        });

        assert_event_serialization(&event, r#"{"t":"connection-established","id":"a"}"#);
    }
}
