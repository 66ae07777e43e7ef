//! [`ActionSimulator`] – timed completion of long-running actions.
//!
//! A navigation is simulated as a single delayed state transition running
//! on its own tokio task, so the control channel keeps receiving while the
//! rover is "driving".  Completions are not cancellable: a later NAVIGATE
//! does not stop an earlier one, and whichever completion fires last decides
//! the final position.

use std::sync::Arc;
use std::time::Duration;

use rover_middleware::BackendPublisher;
use rover_types::{EventTag, OutboundEvent};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::state_store::StateStore;

/// Default simulated travel time between any two nodes.
pub const DEFAULT_TRANSIT_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct ActionSimulator {
    store: StateStore,
    publisher: Arc<dyn BackendPublisher>,
    transit_delay: Duration,
}

impl ActionSimulator {
    pub fn new(store: StateStore, publisher: Arc<dyn BackendPublisher>) -> Self {
        Self {
            store,
            publisher,
            transit_delay: DEFAULT_TRANSIT_DELAY,
        }
    }

    /// Override the simulated travel time (builder-style).
    pub fn with_transit_delay(mut self, delay: Duration) -> Self {
        self.transit_delay = delay;
        self
    }

    pub fn transit_delay(&self) -> Duration {
        self.transit_delay
    }

    /// Schedule arrival at `destination` after the transit delay.
    ///
    /// On completion the rover is parked at `destination` in `IDLE`, the
    /// full state is published, then `DESTINATION_REACHED`.
    pub fn start_navigation(&self, destination: Option<String>) -> JoinHandle<()> {
        let sim = self.clone();
        tokio::spawn(async move { sim.complete_navigation(destination).await })
    }

    #[instrument(skip(self))]
    async fn complete_navigation(&self, destination: Option<String>) {
        tokio::time::sleep(self.transit_delay).await;
        info!(destination = ?destination, "arrived at destination");

        let ((), snapshot) = self.store.apply(|s| s.arrive(destination));
        self.publisher.publish_state(&snapshot).await;
        self.publisher
            .publish_event(&OutboundEvent::now(EventTag::DestinationReached))
            .await;
    }
}
