mod connection_registry;
mod room_registry;

pub use self::connection_registry::{Connection, ConnectionRegistry, Outbox, PeerState};
pub use self::room_registry::RoomRegistry;
