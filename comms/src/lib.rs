/// Set of commands which the signaling server can receive from a peer
pub mod command;
/// Set of events the signaling server emits, either relayed to a single peer or broadcast to a room
pub mod event;
/// Implementation of event and command transportation over TCP Streams.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
