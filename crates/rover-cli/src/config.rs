//! Configuration – `~/.rover/config.toml` plus environment overrides.
//!
//! Every field has a default, so the file is optional.  Environment
//! variables win over the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rover_types::RoverError;

/// Runtime configuration of the simulator.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend host for both HTTP pushes and the control channel.
    pub backend_host: String,
    /// Backend HTTP/WebSocket port.
    pub backend_port: u16,
    /// UDP port the backend listens on for presence announcements.
    pub discovery_port: u16,
    /// Port of this robot's status surface.
    pub robot_port: u16,
    /// Shared secret sent as `X-Api-Key`.
    pub api_key: String,
    /// Path of the control-channel WebSocket endpoint.
    pub control_path: String,
    pub reconnect_delay_secs: u64,
    pub transit_delay_secs: u64,
    pub announce_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Period of the full-state heartbeat push; `0` disables it.
    pub state_push_interval_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend_host", &self.backend_host)
            .field("backend_port", &self.backend_port)
            .field("discovery_port", &self.discovery_port)
            .field("robot_port", &self.robot_port)
            .field(
                "api_key",
                if self.api_key.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .field("control_path", &self.control_path)
            .field("reconnect_delay_secs", &self.reconnect_delay_secs)
            .field("transit_delay_secs", &self.transit_delay_secs)
            .field("announce_interval_secs", &self.announce_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("state_push_interval_secs", &self.state_push_interval_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_host: "localhost".to_string(),
            backend_port: 3003,
            discovery_port: 3001,
            robot_port: 8000,
            api_key: "secret-robot-key".to_string(),
            control_path: "/ws/robot/control".to_string(),
            reconnect_delay_secs: 5,
            transit_delay_secs: 5,
            announce_interval_secs: 10,
            request_timeout_secs: 5,
            state_push_interval_secs: 0,
        }
    }
}

impl Config {
    /// `http://{host}:{port}` – base of the `/table/*` endpoints.
    pub fn backend_http_url(&self) -> String {
        format!("http://{}:{}", self.backend_host, self.backend_port)
    }

    /// `ws://{host}:{port}{control_path}` – the control channel.
    pub fn control_url(&self) -> String {
        let path = if self.control_path.starts_with('/') {
            self.control_path.clone()
        } else {
            format!("/{}", self.control_path)
        };
        format!("ws://{}:{}{}", self.backend_host, self.backend_port, path)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn transit_delay(&self) -> Duration {
        Duration::from_secs(self.transit_delay_secs)
    }

    pub fn announce_interval(&self) -> Duration {
        Duration::from_secs(self.announce_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn state_push_interval(&self) -> Duration {
        Duration::from_secs(self.state_push_interval_secs)
    }

    /// Reject values the runtime cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RoverError> {
        if self.backend_host.trim().is_empty() {
            return Err(RoverError::Config("backend_host must not be empty".into()));
        }
        for (name, value) in [
            ("announce_interval_secs", self.announce_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(RoverError::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }
}

/// Return `$ROVER_CONFIG`, or `~/.rover/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("ROVER_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rover").join("config.toml")
}

/// Load the effective configuration: file (if any), then environment.
///
/// # Errors
///
/// Returns [`RoverError::Config`] when the file exists but cannot be read or
/// parsed, or when the result fails [`Config::validate`].
pub fn load() -> Result<Config, RoverError> {
    let mut cfg = load_from(&config_path())?.unwrap_or_default();
    apply_overrides(&mut cfg, |key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}

/// Load the file at `path`.  Returns `None` if it does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RoverError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| RoverError::Config(format!("failed to read {}: {e}", path.display())))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| RoverError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply overrides read through `lookup` (normally the process environment).
///
/// | Variable | Config field |
/// |---|---|
/// | `BACKEND_HOST` | `backend_host` |
/// | `BACKEND_PORT` | `backend_port` |
/// | `BACKEND_UDP_PORT` | `discovery_port` |
/// | `ROBOT_PORT` | `robot_port` |
/// | `ROBOT_API_KEY` | `api_key` |
/// | `ROVER_CONTROL_PATH` | `control_path` |
/// | `ROVER_RECONNECT_DELAY_SECS` | `reconnect_delay_secs` |
/// | `ROVER_TRANSIT_DELAY_SECS` | `transit_delay_secs` |
/// | `ROVER_ANNOUNCE_INTERVAL_SECS` | `announce_interval_secs` |
/// | `ROVER_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |
/// | `ROVER_STATE_PUSH_INTERVAL_SECS` | `state_push_interval_secs` |
///
/// Unparseable numbers are ignored and the previous value is kept.
pub fn apply_overrides(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BACKEND_HOST") {
        cfg.backend_host = v;
    }
    if let Some(v) = lookup("ROBOT_API_KEY") {
        cfg.api_key = v;
    }
    if let Some(v) = lookup("ROVER_CONTROL_PATH") {
        cfg.control_path = v;
    }
    override_parsed(&lookup, "BACKEND_PORT", &mut cfg.backend_port);
    override_parsed(&lookup, "BACKEND_UDP_PORT", &mut cfg.discovery_port);
    override_parsed(&lookup, "ROBOT_PORT", &mut cfg.robot_port);
    override_parsed(&lookup, "ROVER_RECONNECT_DELAY_SECS", &mut cfg.reconnect_delay_secs);
    override_parsed(&lookup, "ROVER_TRANSIT_DELAY_SECS", &mut cfg.transit_delay_secs);
    override_parsed(&lookup, "ROVER_ANNOUNCE_INTERVAL_SECS", &mut cfg.announce_interval_secs);
    override_parsed(&lookup, "ROVER_REQUEST_TIMEOUT_SECS", &mut cfg.request_timeout_secs);
    override_parsed(&lookup, "ROVER_STATE_PUSH_INTERVAL_SECS", &mut cfg.state_push_interval_secs);
}

fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) {
    if let Some(v) = lookup(key)
        && let Ok(parsed) = v.trim().parse::<T>()
    {
        *slot = parsed;
    }
}
