//! [`RobotState`] – the single snapshot the rover reports to its backend.
//!
//! The struct serialises with the backend's camelCase keys and is pushed as a
//! whole (never as a delta) on every mutation.  Transition helpers live here
//! so the runtime only decides *when* to apply them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{HOME_NODE, TRANSIT_SENTINEL};

/// Coarse health flag.  Fixed at [`SystemHealth::Ok`] by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemHealth {
    #[default]
    Ok,
    Degraded,
    Fault,
}

/// Cargo bay status.  Carried through untouched by command handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CargoStatus {
    #[default]
    Empty,
    Loaded,
}

/// Drive mode of the rover.
///
/// `SET_MODE` accepts any string, so unrecognised modes are preserved
/// verbatim in [`DriveMode::Other`] and serialise back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum DriveMode {
    #[default]
    Idle,
    Navigating,
    Manual,
    Other(String),
}

impl DriveMode {
    pub fn as_str(&self) -> &str {
        match self {
            DriveMode::Idle => "IDLE",
            DriveMode::Navigating => "NAVIGATING",
            DriveMode::Manual => "MANUAL",
            DriveMode::Other(s) => s,
        }
    }
}

impl From<String> for DriveMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "IDLE" => DriveMode::Idle,
            "NAVIGATING" => DriveMode::Navigating,
            "MANUAL" => DriveMode::Manual,
            _ => DriveMode::Other(s),
        }
    }
}

impl From<&str> for DriveMode {
    fn from(s: &str) -> Self {
        DriveMode::from(s.to_string())
    }
}

impl From<DriveMode> for String {
    fn from(mode: DriveMode) -> Self {
        match mode {
            DriveMode::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DriveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full robot state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotState {
    pub system_health: SystemHealth,
    /// Percentage in `0..=100`; out-of-range input is clamped.
    #[serde(deserialize_with = "clamped_percent")]
    battery_level: u8,
    pub drive_mode: DriveMode,
    pub cargo_status: CargoStatus,
    /// A node name, [`TRANSIT_SENTINEL`] while moving, or `None` when a
    /// navigation was issued without a destination.
    pub current_position: Option<String>,
    pub last_node: Option<String>,
    pub target_node: Option<String>,
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            system_health: SystemHealth::Ok,
            battery_level: 50,
            drive_mode: DriveMode::Idle,
            cargo_status: CargoStatus::Empty,
            current_position: Some(HOME_NODE.to_string()),
            last_node: None,
            target_node: None,
        }
    }
}

impl RobotState {
    pub fn battery_level(&self) -> u8 {
        self.battery_level
    }

    /// Builder-style battery override, clamped to `0..=100`.
    pub fn with_battery_level(mut self, percent: u8) -> Self {
        self.battery_level = percent.min(100);
        self
    }

    /// `true` while the position holds the transit sentinel.
    pub fn is_in_transit(&self) -> bool {
        self.current_position.as_deref() == Some(TRANSIT_SENTINEL)
    }

    /// Enter `NAVIGATING` towards `destination`.
    ///
    /// Missing endpoints are stored as `None` rather than rejected.
    pub fn begin_navigation(&mut self, start: Option<String>, destination: Option<String>) {
        self.drive_mode = DriveMode::Navigating;
        self.current_position = Some(TRANSIT_SENTINEL.to_string());
        self.target_node = destination;
        self.last_node = start;
    }

    /// Complete a navigation: park at `destination` and drop back to `IDLE`.
    ///
    /// Applied unconditionally, so a superseded navigation still overwrites
    /// whatever a later command left behind.
    pub fn arrive(&mut self, destination: Option<String>) {
        self.current_position = destination;
        self.drive_mode = DriveMode::Idle;
        self.target_node = None;
    }

    /// Switch to `MANUAL`.  Returns `false` (and changes nothing) when the
    /// rover is already in manual mode.
    ///
    /// Position and target are left alone, so mid-transit the rover reports
    /// `MOVING` with a target while not `NAVIGATING` until the pending
    /// arrival lands.
    pub fn enter_manual(&mut self) -> bool {
        if self.drive_mode == DriveMode::Manual {
            return false;
        }
        self.drive_mode = DriveMode::Manual;
        true
    }

    /// Overwrite the drive mode.  Only the mode changes: a rover in transit
    /// keeps its [`TRANSIT_SENTINEL`] position and target until the pending
    /// arrival fires.
    pub fn set_mode(&mut self, mode: DriveMode) {
        self.drive_mode = mode;
    }

    /// Halt: `IDLE`, target cleared, and a rover caught mid-transit is
    /// reported back at [`HOME_NODE`].
    pub fn stop(&mut self) {
        self.drive_mode = DriveMode::Idle;
        self.target_node = None;
        if self.is_in_transit() {
            self.current_position = Some(HOME_NODE.to_string());
        }
    }
}

fn clamped_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, 100) as u8)
}
