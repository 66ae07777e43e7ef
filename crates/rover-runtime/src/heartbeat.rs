//! [`StateHeartbeat`] – periodic re-push of the full state snapshot.
//!
//! Pushes are best-effort, so a backend that missed one stays stale until
//! the next mutation.  The heartbeat re-sends the current snapshot on a
//! fixed period to close that gap.  A zero period disables it.

use std::sync::Arc;
use std::time::Duration;

use rover_middleware::BackendPublisher;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::state_store::StateStore;

pub struct StateHeartbeat {
    store: StateStore,
    publisher: Arc<dyn BackendPublisher>,
    period: Duration,
}

impl StateHeartbeat {
    pub fn new(store: StateStore, publisher: Arc<dyn BackendPublisher>, period: Duration) -> Self {
        Self {
            store,
            publisher,
            period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `false` when the period is zero.
    pub fn is_enabled(&self) -> bool {
        !self.period.is_zero()
    }

    /// Spawn [`StateHeartbeat::run`] on the current runtime, or return
    /// `None` when disabled.
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            info!("state heartbeat disabled");
            return None;
        }
        Some(tokio::spawn(self.run()))
    }

    /// Publish the current snapshot every period, starting one period from
    /// now.  Returns immediately when disabled.
    pub async fn run(self) {
        if !self.is_enabled() {
            return;
        }
        info!(period_secs = self.period.as_secs_f64(), "state heartbeat started");
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            debug!("state heartbeat");
            self.publisher.publish_state(&self.store.get()).await;
        }
    }
}
