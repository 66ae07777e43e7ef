//! `rover-cli` – entry point of the simulated delivery robot.
//!
//! Start-up order:
//!
//! 1. Install structured logging (`RUST_LOG`, `ROVER_LOG_FORMAT`, optional OTLP).
//! 2. Load `~/.rover/config.toml` (or `$ROVER_CONFIG`) plus env overrides.
//! 3. Spawn the status surface, the UDP presence announcer and the optional
//!    state heartbeat.
//! 4. Hold the backend control channel open until **Ctrl-C**.

mod config;

use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

use rover_middleware::{BackendPublisher, ConnectionManager, HttpBackendPublisher, WsConnector};
use rover_runtime::{ActionSimulator, CommandDispatcher, StateHeartbeat, StateStore, init_tracing};
use rover_status::{Announcer, StatusServer};
use rover_types::RobotState;

#[tokio::main]
async fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    let _tracing = init_tracing("rover-sim");

    print_banner();

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(config = ?cfg, path = %config::config_path().display(), "configuration loaded");

    // ── Backend publisher ─────────────────────────────────────────────────
    let publisher: Arc<dyn BackendPublisher> = match HttpBackendPublisher::new(
        cfg.backend_http_url(),
        cfg.api_key.clone(),
        cfg.request_timeout(),
    ) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            error!(error = %e, "failed to build backend publisher");
            return ExitCode::FAILURE;
        }
    };

    // ── Robot state + command handling ────────────────────────────────────
    let store = StateStore::new(RobotState::default());
    let simulator = ActionSimulator::new(store.clone(), publisher.clone())
        .with_transit_delay(cfg.transit_delay());
    let dispatcher = Arc::new(CommandDispatcher::new(
        store.clone(),
        Arc::clone(&publisher),
        simulator,
    ));
    StateHeartbeat::new(store.clone(), publisher, cfg.state_push_interval()).spawn();

    // ── Status surface ────────────────────────────────────────────────────
    let snapshot_store = store.clone();
    let server = StatusServer::new(move || snapshot_store.get()).with_port(cfg.robot_port);
    tokio::spawn(async move {
        if let Err(e) = server.run().await {
            warn!(error = %e, "status server stopped");
        }
    });

    // ── Presence announcements ────────────────────────────────────────────
    let announcer = Announcer::new(cfg.robot_port, cfg.discovery_port)
        .with_interval(cfg.announce_interval());
    tokio::spawn(async move {
        if let Err(e) = announcer.run().await {
            warn!(error = %e, "presence announcer stopped");
        }
    });

    println!(
        "  Status surface on port {}, control channel {}",
        cfg.robot_port.to_string().bold(),
        cfg.control_url().dimmed()
    );

    // ── Control channel ───────────────────────────────────────────────────
    let manager = ConnectionManager::new(WsConnector::new(cfg.control_url()), dispatcher)
        .with_reconnect_delay(cfg.reconnect_delay());

    tokio::select! {
        () = manager.run() => {}
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            println!();
            println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
            info!(attempts = manager.attempts(), "shutdown requested");
        }
    }

    ExitCode::SUCCESS
}

fn print_banner() {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║         Rover Robot Simulator        ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
}
