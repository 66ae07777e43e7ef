//! Test doubles shared by the unit tests: an in-memory [`BackendPublisher`],
//! a backend that rejects everything, and a log-capturing subscriber.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rover_middleware::BackendPublisher;
use rover_types::{EventTag, OutboundEvent, RobotState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum Published {
    State(RobotState),
    Event(EventTag),
}

#[derive(Default)]
pub struct RecordingPublisher {
    log: Mutex<Vec<Published>>,
}

impl RecordingPublisher {
    pub fn take(&self) -> Vec<Published> {
        std::mem::take(&mut *self.log.lock().unwrap())
    }

    pub fn states(&self) -> usize {
        self.count(|p| matches!(p, Published::State(_)))
    }

    pub fn events(&self, tag: EventTag) -> usize {
        self.count(|p| *p == Published::Event(tag))
    }

    fn count(&self, pred: impl Fn(&Published) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|p| pred(p)).count()
    }
}

#[async_trait]
impl BackendPublisher for RecordingPublisher {
    async fn publish_state(&self, snapshot: &RobotState) {
        self.log.lock().unwrap().push(Published::State(snapshot.clone()));
    }

    async fn publish_event(&self, event: &OutboundEvent) {
        self.log.lock().unwrap().push(Published::Event(event.event));
    }
}

// ---------------------------------------------------------------------------
// Rejecting backend
// ---------------------------------------------------------------------------

/// Serve `500 Internal Server Error` to every request.  Returns the base URL
/// and a counter of requests received.
pub async fn spawn_rejecting_backend() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&requests);
    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.unwrap();
            let counter = Arc::clone(&counter);
            tokio::spawn(async move { reject(stream, &counter).await });
        }
    });

    (base, requests)
}

async fn reject(mut stream: TcpStream, counter: &AtomicUsize) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else { return };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    counter.fetch_add(1, Ordering::SeqCst);

    let body = "simulated failure";
    let response = format!(
        "HTTP/1.1 500 Internal Server Error\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn request_complete(buf: &[u8]) -> bool {
    let text = String::from_utf8_lossy(buf);
    let Some(head_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..head_end]
        .lines()
        .find_map(|l| {
            l.to_ascii_lowercase()
                .strip_prefix("content-length:")
                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
        })
        .unwrap_or(0);
    buf.len() >= head_end + 4 + content_length
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

/// Shared buffer the capturing subscriber writes formatted output into.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Plain-text subscriber that also reports span creation, for use with
/// `tracing::subscriber::set_default`.
pub fn capturing_subscriber() -> (CapturedLogs, impl tracing::Subscriber + Send + Sync + 'static) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .with_span_events(FmtSpan::NEW)
        .finish();
    (logs, subscriber)
}
