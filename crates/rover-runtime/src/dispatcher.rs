//! [`CommandDispatcher`] – turns control frames into state transitions.
//!
//! | Command | Effect | Publishes |
//! |---|---|---|
//! | `NAVIGATE` | `NAVIGATING`, position = transit sentinel, target/last set, arrival scheduled | `START_BUTTON_PRESSED`, state |
//! | `SET_MODE` | drive mode = given string, unvalidated (missing → `""`) | state |
//! | `DRIVE_COMMAND` | `MANUAL` unless already manual | state, only on the transition |
//! | `STOP` | `IDLE`, target cleared, mid-transit position reset to home | state |
//!
//! Frames that fail to decode are logged and dropped without touching the
//! state or the backend.

use std::sync::Arc;

use async_trait::async_trait;
use rover_middleware::{BackendPublisher, SessionHandler};
use rover_types::{Command, DriveMode, EventTag, OutboundEvent, RoverError, sanitize_velocity};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::action::ActionSimulator;
use crate::state_store::StateStore;

/// What a dispatched command did.
#[derive(Debug)]
pub enum Dispatch {
    /// The state changed and one snapshot was published.
    StateChanged,
    /// Nothing changed; nothing was published.
    Unchanged,
    /// A navigation started; the handle resolves once the arrival has been
    /// applied and published.
    Navigating(JoinHandle<()>),
}

pub struct CommandDispatcher {
    store: StateStore,
    publisher: Arc<dyn BackendPublisher>,
    simulator: ActionSimulator,
}

impl CommandDispatcher {
    pub fn new(
        store: StateStore,
        publisher: Arc<dyn BackendPublisher>,
        simulator: ActionSimulator,
    ) -> Self {
        Self {
            store,
            publisher,
            simulator,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Decode `payload` and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Decode`] (already logged) when the frame is not
    /// a valid command.  The state is left untouched in that case.
    pub async fn handle_frame(&self, payload: &str) -> Result<Dispatch, RoverError> {
        let command = Command::decode(payload).inspect_err(|e| {
            error!(error = %e, payload = %payload, "error parsing control message");
        })?;
        Ok(self.dispatch(command).await)
    }

    /// Apply `command` to the state and publish the outcome.
    #[instrument(skip(self, command), fields(command = command.name()))]
    pub async fn dispatch(&self, command: Command) -> Dispatch {
        match command {
            Command::Navigate { start, destination } => {
                info!(start = ?start, destination = ?destination, "navigating");
                self.publisher
                    .publish_event(&OutboundEvent::now(EventTag::StartButtonPressed))
                    .await;

                let target = destination.clone();
                let ((), snapshot) = self.store.apply(|s| s.begin_navigation(start, target));
                self.publisher.publish_state(&snapshot).await;

                Dispatch::Navigating(self.simulator.start_navigation(destination))
            }
            Command::SetMode { mode } => {
                let mode = mode.unwrap_or_else(|| DriveMode::Other(String::new()));
                info!(mode = %mode, "setting drive mode");
                let ((), snapshot) = self.store.apply(|s| s.set_mode(mode));
                self.publisher.publish_state(&snapshot).await;
                Dispatch::StateChanged
            }
            Command::DriveCommand {
                linear_velocity,
                angular_velocity,
            } => {
                info!(
                    linear = sanitize_velocity(linear_velocity),
                    angular = sanitize_velocity(angular_velocity),
                    "manual drive"
                );
                let (entered, snapshot) = self.store.apply(|s| s.enter_manual());
                if !entered {
                    debug!("already in MANUAL; no state update");
                    return Dispatch::Unchanged;
                }
                self.publisher.publish_state(&snapshot).await;
                Dispatch::StateChanged
            }
            Command::Stop => {
                info!("stop requested");
                let ((), snapshot) = self.store.apply(|s| s.stop());
                self.publisher.publish_state(&snapshot).await;
                Dispatch::StateChanged
            }
        }
    }
}

#[async_trait]
impl SessionHandler for CommandDispatcher {
    /// Give the backend a fresh snapshot after every (re)connect.
    async fn on_open(&self) {
        self.publisher.publish_state(&self.store.get()).await;
    }

    async fn on_frame(&self, payload: &str) {
        // Decode failures are logged inside `handle_frame`; navigation tasks
        // keep running after their handle is dropped.
        let _ = self.handle_frame(payload).await;
    }
}
