//! Discrete events reported to the backend alongside state snapshots.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Named event tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventTag {
    /// A navigation was accepted and the rover is leaving.
    StartButtonPressed,
    /// A navigation completed.
    DestinationReached,
}

/// Body of a `POST /table/event` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub event: EventTag,
    /// Second precision, `Z` suffix (e.g. `2026-10-17T08:30:00Z`).
    #[serde(serialize_with = "rfc3339_seconds")]
    pub timestamp: DateTime<Utc>,
}

impl OutboundEvent {
    pub fn new(event: EventTag, timestamp: DateTime<Utc>) -> Self {
        Self { event, timestamp }
    }

    /// Stamp `event` with the current UTC time.
    pub fn now(event: EventTag) -> Self {
        Self::new(event, Utc::now())
    }
}

fn rfc3339_seconds<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}
