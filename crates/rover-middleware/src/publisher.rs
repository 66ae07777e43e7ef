//! Backend Publisher – best-effort push of state snapshots and events.
//!
//! Every call is a single `POST` carrying the `X-Api-Key` header.  Failures
//! are logged and swallowed: there is no retry, no queue and no backpressure,
//! so updates issued while the backend is down are lost.
//!
//! | Call | Endpoint | Body |
//! |---|---|---|
//! | [`BackendPublisher::publish_state`] | `POST /table/state` | full [`RobotState`] |
//! | [`BackendPublisher::publish_event`] | `POST /table/event` | [`OutboundEvent`] |

use std::time::Duration;

use async_trait::async_trait;
use rover_types::{OutboundEvent, RobotState, RoverError};
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Header carrying the shared backend secret.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Path of the state snapshot endpoint.
pub const STATE_PATH: &str = "/table/state";

/// Path of the discrete event endpoint.
pub const EVENT_PATH: &str = "/table/event";

/// Outbound sink for state snapshots and events.
///
/// # Contract
///
/// Implementations must never panic and never report failure to the caller;
/// command processing continues regardless of the backend's health.
#[async_trait]
pub trait BackendPublisher: Send + Sync {
    /// Push a full snapshot of the robot state.
    async fn publish_state(&self, snapshot: &RobotState);

    /// Push a single discrete event.
    async fn publish_event(&self, event: &OutboundEvent);
}

/// [`BackendPublisher`] speaking HTTP/JSON to the backend.
pub struct HttpBackendPublisher {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpBackendPublisher {
    /// Create a publisher for `base_url` (e.g. `"http://localhost:3003"`).
    ///
    /// `timeout` bounds each request so a hung backend never stalls the
    /// caller for longer than one request.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RoverError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RoverError::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` as JSON to `path` and require a 2xx answer.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Publish`] for a non-success status (with the
    /// response text) and [`RoverError::Transport`] when the request could
    /// not be completed at all.
    pub async fn post_json<T>(&self, path: &str, body: &T) -> Result<(), RoverError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| RoverError::Transport(format!("POST {url}: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(RoverError::Publish(format!("{} - {}", status.as_u16(), text)))
    }

    fn report(&self, what: &str, result: Result<(), RoverError>) {
        match result {
            Ok(()) => info!(kind = what, "backend update delivered"),
            Err(RoverError::Publish(detail)) => {
                warn!(kind = what, detail = %detail, "backend rejected update")
            }
            Err(e) => error!(kind = what, error = %e, "backend update failed"),
        }
    }
}

#[async_trait]
impl BackendPublisher for HttpBackendPublisher {
    async fn publish_state(&self, snapshot: &RobotState) {
        debug!(drive_mode = %snapshot.drive_mode, "sending state update to backend");
        let result = self.post_json(STATE_PATH, snapshot).await;
        self.report("state", result);
    }

    async fn publish_event(&self, event: &OutboundEvent) {
        debug!(event = ?event.event, "sending event to backend");
        let result = self.post_json(EVENT_PATH, event).await;
        self.report("event", result);
    }
}
