/// Command line and environment configuration
pub mod config;
/// Log subscriber setup
pub mod logging;
/// Accept loop spawning one session per peer connection
pub mod server;
/// Per connection driver between the transport and the signaling core
pub mod session;
/// Connection and room state, lifecycle transitions and message routing
pub mod signaling;
