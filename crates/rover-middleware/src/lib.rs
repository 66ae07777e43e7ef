//! `rover-middleware` – the rover's links to its backend.
//!
//! Moves bytes between the simulator and the supervising backend without
//! caring what the commands mean.
//!
//! # Modules
//!
//! - [`control`] – [`ConnectionManager`]: the long-lived WebSocket control
//!   channel with a flat-delay, never-ending reconnect loop.  Inbound frames
//!   are handed to a [`SessionHandler`] in arrival order.
//! - [`publisher`] – [`BackendPublisher`]: fire-and-forget HTTP push of state
//!   snapshots and discrete events, authenticated with `X-Api-Key`.

pub mod control;
pub mod publisher;

pub use control::{
    ConnectionManager, Connector, DEFAULT_RECONNECT_DELAY, FrameStream, SessionHandler,
    SessionState, WsConnector,
};
pub use publisher::{BackendPublisher, HttpBackendPublisher};
