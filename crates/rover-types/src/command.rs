//! [`Command`] – typed view of an inbound control-channel frame.
//!
//! Frames are JSON objects tagged by a `"command"` field.  Decoding is
//! lenient about *fields* (missing or `null` endpoints and modes become
//! `None`, missing or `null` velocities become `0.0`) but strict about the
//! *tag*: an unknown command is a [`RoverError::Decode`].

use serde::{Deserialize, Deserializer};

use crate::{DriveMode, RoverError};

/// A decoded control command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Travel from `start` to `destination`.
    Navigate {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        destination: Option<String>,
    },
    /// Force the drive mode to an arbitrary string.
    SetMode {
        #[serde(default)]
        mode: Option<DriveMode>,
    },
    /// Teleop velocity command.
    DriveCommand {
        #[serde(default, deserialize_with = "null_as_zero")]
        linear_velocity: f64,
        #[serde(default, deserialize_with = "null_as_zero")]
        angular_velocity: f64,
    },
    /// Halt and return to `IDLE`.
    Stop,
}

impl Command {
    /// Decode a raw frame payload.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Decode`] for malformed JSON, a missing or
    /// unknown `"command"` tag, or a field of the wrong type.
    pub fn decode(payload: &str) -> Result<Self, RoverError> {
        serde_json::from_str(payload).map_err(|e| RoverError::Decode(e.to_string()))
    }

    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Navigate { .. } => "NAVIGATE",
            Command::SetMode { .. } => "SET_MODE",
            Command::DriveCommand { .. } => "DRIVE_COMMAND",
            Command::Stop => "STOP",
        }
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Clamp a teleop velocity to `[-1.0, 1.0]`; non-finite input becomes `0.0`.
pub fn sanitize_velocity(v: f64) -> f64 {
    if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
}
