//! [`StatusServer`] – read-only HTTP query surface.
//!
//! Listens on `0.0.0.0:8000` (configurable via [`StatusServer::with_port`]).
//! Each connection carries one request and is closed after the response.
//!
//! | Request | Response |
//! |---|---|
//! | `GET /health` | `{"status":"ok","message":"Robot is online"}` |
//! | `GET /status` | current `RobotState` |
//! | `GET /nodes` | `{"nodes":[…]}` |
//! | other path | 404 |
//! | other method | 405 |

use std::net::SocketAddr;
use std::sync::Arc;

use rover_types::{KNOWN_NODES, RobotState, RoverError};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Default TCP port for the query surface.
pub const DEFAULT_PORT: u16 = 8000;

/// Upper bound on the request head we are willing to buffer.
const MAX_REQUEST_HEAD: usize = 8 * 1024;

type Snapshot = Arc<dyn Fn() -> RobotState + Send + Sync>;

pub struct StatusServer {
    snapshot: Snapshot,
    port: u16,
}

impl StatusServer {
    /// Create a server on [`DEFAULT_PORT`] that reads state through
    /// `snapshot`.
    pub fn new(snapshot: impl Fn() -> RobotState + Send + Sync + 'static) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
            port: DEFAULT_PORT,
        }
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Bind `0.0.0.0:{port}` and serve forever.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Io`] if the listener cannot bind.
    pub async fn run(self) -> Result<(), RoverError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RoverError::Io(format!("status server bind error on {addr}: {e}")))?;
        info!(port = self.port, "status server listening");
        self.serve(listener).await;
        Ok(())
    }

    /// Serve connections from an already-bound listener.  Never returns.
    pub async fn serve(self, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    let snapshot = Arc::clone(&self.snapshot);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, snapshot).await {
                            warn!(peer = %peer, error = %e, "status client error");
                        }
                    });
                }
                Err(e) => error!(error = %e, "status accept error"),
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, snapshot: Snapshot) -> Result<(), RoverError> {
    let head = read_request_head(&mut stream).await?;
    let request_line = head.lines().next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let (status, body) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => {
            debug!(method, target, "status request");
            route(method, target, || snapshot())
        }
        _ => (400, json!({ "error": "bad request" })),
    };

    let body = body.to_string();
    let response = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        status,
        reason(status),
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

async fn read_request_head(stream: &mut TcpStream) -> Result<String, RoverError> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if buf.len() > MAX_REQUEST_HEAD {
            return Err(RoverError::Io("request head too large".to_string()));
        }
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Map a request to `(status, json body)`.
pub(crate) fn route(method: &str, target: &str, snapshot: impl FnOnce() -> RobotState) -> (u16, Value) {
    let path = target.split('?').next().unwrap_or(target);
    match (method, path) {
        ("GET", "/health") => (200, json!({ "status": "ok", "message": "Robot is online" })),
        ("GET", "/status") => match serde_json::to_value(snapshot()) {
            Ok(state) => (200, state),
            Err(e) => (500, json!({ "error": e.to_string() })),
        },
        ("GET", "/nodes") => (200, json!({ "nodes": KNOWN_NODES })),
        (_, "/health" | "/status" | "/nodes") => (405, json!({ "error": "method not allowed" })),
        _ => (404, json!({ "error": "not found" })),
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rover_types::DriveMode;

    #[test]
    fn default_port_is_8000() {
        let server = StatusServer::new(RobotState::default);
        assert_eq!(server.port(), DEFAULT_PORT);
        assert_eq!(server.with_port(9999).port(), 9999);
    }

    #[test]
    fn health_reports_online() {
        let (status, body) = route("GET", "/health", RobotState::default);
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Robot is online");
    }

    #[test]
    fn status_serves_current_snapshot() {
        let (status, body) = route("GET", "/status?verbose=1", || {
            let mut s = RobotState::default();
            s.set_mode(DriveMode::Manual);
            s
        });
        assert_eq!(status, 200);
        assert_eq!(body["driveMode"], "MANUAL");
        assert_eq!(body["currentPosition"], "Home");
        assert_eq!(body["batteryLevel"], 50);
    }

    #[test]
    fn nodes_lists_fixed_map() {
        let (status, body) = route("GET", "/nodes", RobotState::default);
        assert_eq!(status, 200);
        let nodes = body["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), KNOWN_NODES.len());
        assert_eq!(nodes[5], "Charging Station");
    }

    #[test]
    fn unknown_routes_and_methods() {
        assert_eq!(route("GET", "/table/state", RobotState::default).0, 404);
        assert_eq!(route("POST", "/status", RobotState::default).0, 405);
        assert_eq!(route("DELETE", "/nowhere", RobotState::default).0, 404);
    }

    #[tokio::test]
    async fn serves_status_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = StatusServer::new(|| {
            let mut s = RobotState::default();
            s.begin_navigation(Some("Home".into()), Some("Kitchen".into()));
            s
        });
        tokio::spawn(server.serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /status HTTP/1.1\r\nHost: robot\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        let body = response.split("\r\n\r\n").nth(1).unwrap();
        let state: Value = serde_json::from_str(body).unwrap();
        assert_eq!(state["driveMode"], "NAVIGATING");
        assert_eq!(state["targetNode"], "Kitchen");
        assert_eq!(state["currentPosition"], "MOVING");
    }

    #[tokio::test]
    async fn garbage_request_gets_400() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(StatusServer::new(RobotState::default).serve(listener));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"\r\n\r\n").await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 400 Bad Request"));
    }
}
