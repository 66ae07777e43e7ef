//! `rover-runtime` – the rover's behaviour.
//!
//! Interprets commands from the control channel and simulates their effect
//! on the shared robot state.
//!
//! # Modules
//!
//! - [`state_store`] – [`StateStore`]: the lock-guarded owner of the single
//!   [`RobotState`][rover_types::RobotState]; all mutations are serialised.
//! - [`dispatcher`] – [`CommandDispatcher`]: decodes frames, applies the
//!   transition rules and publishes every change.  It is the
//!   [`SessionHandler`][rover_middleware::SessionHandler] plugged into the
//!   connection manager.
//! - [`action`] – [`ActionSimulator`]: runs each navigation as an
//!   independent, non-cancellable timed task.
//! - [`heartbeat`] – [`StateHeartbeat`]: periodic re-push of the full
//!   snapshot so a backend that missed an update catches up.
//! - [`telemetry`] – [`init_tracing`]: `tracing-subscriber` setup with an
//!   optional OTLP exporter.

pub mod action;
pub mod dispatcher;
pub mod heartbeat;
pub mod state_store;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use action::{ActionSimulator, DEFAULT_TRANSIT_DELAY};
pub use dispatcher::{CommandDispatcher, Dispatch};
pub use heartbeat::StateHeartbeat;
pub use state_store::StateStore;
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
