use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Peer Command for joining a room, leaving the current room first if there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomCommand {
    // The room to join, created on first join.
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// Peer Command carrying a session description offer for a single target peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferCommand {
    // Opaque negotiation payload, relayed verbatim.
    pub offer: Value,
    // Connection id of the receiving peer.
    pub target: String,
}

/// Peer Command carrying a session description answer for a single target peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCommand {
    pub answer: Value,
    pub target: String,
}

/// Peer Command carrying a connectivity candidate for a single target peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceCandidateCommand {
    pub candidate: Value,
    pub target: String,
}

/// A command which can be sent to the server by a single peer connection.
/// All commands are processed in the context of the room the sending connection currently belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "kebab-case")]
pub enum UserCommand {
    JoinRoom(JoinRoomCommand),
    LeaveRoom,
    StartSharing,
    StopSharing,
    Offer(OfferCommand),
    Answer(AnswerCommand),
    IceCandidate(IceCandidateCommand),
}

impl UserCommand {
    /// The wire name of the command, used in logs and protocol errors
    pub fn name(&self) -> &'static str {
        match self {
            UserCommand::JoinRoom(_) => "join-room",
            UserCommand::LeaveRoom => "leave-room",
            UserCommand::StartSharing => "start-sharing",
            UserCommand::StopSharing => "stop-sharing",
            UserCommand::Offer(_) => "offer",
            UserCommand::Answer(_) => "answer",
            UserCommand::IceCandidate(_) => "ice-candidate",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &UserCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: UserCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    #[test]
    fn test_join_command() {
        let command = UserCommand::JoinRoom(JoinRoomCommand {
            room_id: "demo".to_string(),
        });

        assert_command_serialization(&command, r#"{"_ct":"join-room","roomId":"demo"}"#);
    }

    #[test]
    fn test_start_sharing_command() {
        assert_command_serialization(&UserCommand::StartSharing, r#"{"_ct":"start-sharing"}"#);
    }

    #[test]
    fn test_ice_candidate_command() {
        let command = UserCommand::IceCandidate(IceCandidateCommand {
            candidate: json!({"candidate": "candidate:1 1 udp 2122260223", "sdpMLineIndex": 0}),
            target: "peer-b".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"ice-candidate","candidate":{"candidate":"candidate:1 1 udp 2122260223","sdpMLineIndex":0},"target":"peer-b"}"#,
        );
    }

    #[test]
    fn test_offer_payload_is_carried_verbatim() {
        let command: UserCommand =
            serde_json::from_str(r#"{"_ct":"offer","offer":{"type":"offer","sdp":"v=0"},"target":"b"}"#)
                .unwrap();

        assert_eq!(
            command,
            UserCommand::Offer(OfferCommand {
                offer: json!({"type": "offer", "sdp": "v=0"}),
                target: "b".to_string(),
            })
        );
        assert_eq!(command.name(), "offer");
    }

    #[test]
    fn test_unknown_shapes_are_rejected() {
        // unknown command tag
        assert!(serde_json::from_str::<UserCommand>(r#"{"_ct":"broadcast-all"}"#).is_err());
        // relay without a target
        assert!(serde_json::from_str::<UserCommand>(r#"{"_ct":"answer","answer":"x"}"#).is_err());
        // missing tag
        assert!(serde_json::from_str::<UserCommand>(r#"{"roomId":"demo"}"#).is_err());
    }
}
