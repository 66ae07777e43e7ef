//! [`Announcer`] – periodic UDP presence broadcast.
//!
//! Sends `{"type":"announce","port":<robot_port>}` to
//! `255.255.255.255:<discovery_port>` immediately and then on every
//! interval tick.  A failed send is logged and simply retried on the next
//! tick.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use rover_types::RoverError;
use serde_json::json;
use tokio::net::UdpSocket;
use tracing::{debug, error, info};

/// Default time between two announcements.
pub const DEFAULT_ANNOUNCE_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Announcer {
    robot_port: u16,
    target: SocketAddr,
    interval: Duration,
}

impl Announcer {
    /// Announce `robot_port` to the limited-broadcast address on
    /// `discovery_port`.
    pub fn new(robot_port: u16, discovery_port: u16) -> Self {
        Self {
            robot_port,
            target: SocketAddr::from((Ipv4Addr::BROADCAST, discovery_port)),
            interval: DEFAULT_ANNOUNCE_INTERVAL,
        }
    }

    /// Send to a specific address instead of the broadcast address.
    pub fn with_target(mut self, target: SocketAddr) -> Self {
        self.target = target;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The datagram body.
    pub fn payload(&self) -> String {
        json!({ "type": "announce", "port": self.robot_port }).to_string()
    }

    /// Send one announcement through `socket`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Io`] if the datagram cannot be sent.
    pub async fn announce_once(&self, socket: &UdpSocket) -> Result<(), RoverError> {
        socket.send_to(self.payload().as_bytes(), self.target).await?;
        Ok(())
    }

    /// Announce forever.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Io`] only if the socket cannot be created.
    pub async fn run(self) -> Result<(), RoverError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;
        info!(addr = %self.target, interval_secs = self.interval.as_secs_f64(), "announcing presence");

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.announce_once(&socket).await {
                Ok(()) => debug!(addr = %self.target, port = self.robot_port, "presence announced"),
                Err(e) => error!(addr = %self.target, error = %e, "failed to send presence announcement"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn defaults_target_broadcast_every_ten_seconds() {
        let announcer = Announcer::new(8000, 3001);
        assert_eq!(announcer.target(), "255.255.255.255:3001".parse().unwrap());
        assert_eq!(announcer.interval(), Duration::from_secs(10));
    }

    #[test]
    fn payload_carries_robot_port() {
        let body: Value = serde_json::from_str(&Announcer::new(8123, 3001).payload()).unwrap();
        assert_eq!(body["type"], "announce");
        assert_eq!(body["port"], 8123);
    }

    #[tokio::test]
    async fn run_announces_repeatedly() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let announcer = Announcer::new(8000, 3001)
            .with_target(receiver.local_addr().unwrap())
            .with_interval(Duration::from_millis(20));
        let task = tokio::spawn(announcer.run());

        let mut buf = [0u8; 256];
        for _ in 0..2 {
            let (n, _) = tokio::time::timeout(Duration::from_secs(5), receiver.recv_from(&mut buf))
                .await
                .expect("announcement within timeout")
                .unwrap();
            let body: Value = serde_json::from_slice(&buf[..n]).unwrap();
            assert_eq!(body, serde_json::json!({ "type": "announce", "port": 8000 }));
        }
        task.abort();
    }
}
