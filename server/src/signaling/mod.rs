pub use self::error::SignalingError;
pub use self::ids::{ConnectionId, RoomId};
pub use self::lifecycle_manager::LifecycleManager;
pub use self::registry::{Connection, ConnectionRegistry, Outbox, PeerState, RoomRegistry};
pub use self::signal_router::{NoticeKind, SignalKind, SignalRouter};

mod error;
mod ids;
mod lifecycle_manager;
mod registry;
mod signal_router;
