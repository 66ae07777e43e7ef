//! `rover-status` – how the outside world finds and inspects the rover.
//!
//! Neither piece takes part in command handling; both only read state.
//!
//! 1. [`StatusServer`] answers read-only HTTP queries on the robot port:
//!    `GET /health`, `GET /status` (the current
//!    [`RobotState`][rover_types::RobotState]) and `GET /nodes`.
//! 2. [`Announcer`] periodically broadcasts an unauthenticated UDP
//!    `{"type":"announce","port":…}` datagram so the backend can discover
//!    the robot port.
//!
//! # Usage
//!
//! ```rust,no_run
//! use rover_status::{Announcer, StatusServer};
//! use rover_types::RobotState;
//!
//! #[tokio::main]
//! async fn main() {
//!     tokio::spawn(Announcer::new(8000, 3001).run());
//!     StatusServer::new(RobotState::default)
//!         .with_port(8000)
//!         .run()
//!         .await
//!         .expect("status server failed");
//! }
//! ```

pub mod discovery;
pub mod server;

pub use discovery::{Announcer, DEFAULT_ANNOUNCE_INTERVAL};
pub use server::{DEFAULT_PORT, StatusServer};
