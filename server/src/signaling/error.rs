use super::ids::ConnectionId;
use super::registry::PeerState;

/// Errors surfaced by the signaling core
///
/// None of them is fatal, a failing command leaves every registry untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalingError {
    #[error("connection '{0}' is already registered")]
    AlreadyRegistered(ConnectionId),

    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    /// A command arrived in a state which does not allow it
    #[error("'{command}' is not allowed while {state}")]
    Protocol {
        command: &'static str,
        state: PeerState,
    },

    /// Relay target is not a live connection in the sender's room
    #[error("relay target '{0}' is not connected to the room")]
    TargetNotFound(ConnectionId),
}

impl SignalingError {
    pub(crate) fn protocol(command: &'static str, state: &PeerState) -> Self {
        SignalingError::Protocol {
            command,
            state: state.clone(),
        }
    }
}
