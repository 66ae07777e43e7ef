//! `rover-types` – shared vocabulary of the rover simulator.
//!
//! Everything that crosses a crate boundary lives here: the [`RobotState`]
//! snapshot pushed to the backend, the [`Command`] frames received over the
//! control channel, the discrete [`OutboundEvent`]s, and the global
//! [`RoverError`].

pub mod command;
pub mod event;
pub mod state;

pub use command::{Command, sanitize_velocity};
pub use event::{EventTag, OutboundEvent};
pub use state::{CargoStatus, DriveMode, RobotState, SystemHealth};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder position reported while a navigation is in flight.
pub const TRANSIT_SENTINEL: &str = "MOVING";

/// Node the robot starts at, and falls back to when stopped mid-transit.
pub const HOME_NODE: &str = "Home";

/// Fixed map of node names served by the `/nodes` query endpoint.
pub const KNOWN_NODES: [&str; 6] = [
    "Home",
    "Kitchen",
    "Living Room",
    "Office",
    "Bedroom",
    "Charging Station",
];

/// Global error type spanning control-channel transport, command decoding,
/// backend publishing and configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Command Decode Error: {0}")]
    Decode(String),

    #[error("Control Channel Error: {0}")]
    Transport(String),

    #[error("Backend Publish Error: {0}")]
    Publish(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("I/O Error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RoverError {
    fn from(e: std::io::Error) -> Self {
        RoverError::Io(e.to_string())
    }
}
