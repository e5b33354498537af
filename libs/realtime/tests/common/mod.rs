//! Common test utilities for realtime integration tests
//!
//! A mock WebSocket server that records what clients send, pushes frames on
//! demand and can drop every connection, plus helpers to record client events.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use realtime::{listener, EnvelopeRouter, RealtimeClient, Topic};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Notify};
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
enum ServerCommand {
    Push(String),
    Kick,
}

/// A mock WebSocket server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    commands: broadcast::Sender<ServerCommand>,
    received: Arc<Mutex<Vec<String>>>,
    accepted: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl MockWsServer {
    /// Create and start a new mock WebSocket server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let (commands, _) = broadcast::channel(64);
        let received = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));
        let live = Arc::new(AtomicUsize::new(0));

        {
            let shutdown = Arc::clone(&shutdown);
            let commands = commands.clone();
            let received = Arc::clone(&received);
            let accepted = Arc::clone(&accepted);
            let live = Arc::clone(&live);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            let Ok((stream, _)) = result else { break };
                            let commands = commands.subscribe();
                            let received = Arc::clone(&received);
                            let accepted = Arc::clone(&accepted);
                            let live = Arc::clone(&live);
                            tokio::spawn(async move {
                                Self::handle_connection(stream, commands, received, accepted, live).await;
                            });
                        }
                        _ = shutdown.notified() => break,
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            commands,
            received,
            accepted,
            live,
        }
    }

    async fn handle_connection(
        stream: tokio::net::TcpStream,
        mut commands: broadcast::Receiver<ServerCommand>,
        received: Arc<Mutex<Vec<String>>>,
        accepted: Arc<AtomicUsize>,
        live: Arc<AtomicUsize>,
    ) {
        let ws_stream = match tokio_tungstenite::accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };
        accepted.fetch_add(1, Ordering::SeqCst);
        live.fetch_add(1, Ordering::SeqCst);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => received.lock().push(text),
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }
                command = commands.recv() => {
                    match command {
                        Ok(ServerCommand::Push(text)) => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        // Drop the socket without a closing handshake
                        Ok(ServerCommand::Kick) | Err(_) => break,
                    }
                }
            }
        }

        live.fetch_sub(1, Ordering::SeqCst);
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Send a text frame to every connected client
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.commands.send(ServerCommand::Push(text.into()));
    }

    /// Drop every live connection abruptly
    pub fn kick_all(&self) {
        let _ = self.commands.send(ServerCommand::Kick);
    }

    /// Text frames received from clients, in arrival order
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Completed handshakes since start
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn live_connections(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
        self.kick_all();
    }
}

/// A ws:// URL nothing listens on; connecting is refused immediately
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}

/// Router used by the integration tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    NewOrder,
    OrderUpdate,
}

pub struct TestRouter;

impl EnvelopeRouter for TestRouter {
    type Kind = TestKind;

    fn route_key(&self, envelope_type: &str) -> Option<TestKind> {
        match envelope_type {
            "new_order" => Some(TestKind::NewOrder),
            "order_update" => Some(TestKind::OrderUpdate),
            _ => None,
        }
    }
}

/// One event observed by a recording listener
#[derive(Debug, Clone)]
pub struct Recorded {
    pub name: &'static str,
    pub envelope: Option<Value>,
    pub error: Option<String>,
    pub attempt: Option<usize>,
}

/// Subscribe a recording listener for each `(topic, name)` pair
pub fn record<R: EnvelopeRouter>(
    client: &RealtimeClient<R>,
    topics: Vec<(Topic<R::Kind>, &'static str)>,
) -> mpsc::UnboundedReceiver<Recorded> {
    let (tx, rx) = mpsc::unbounded_channel();
    for (topic, name) in topics {
        let tx = tx.clone();
        client.on(
            topic,
            listener(move |payload| {
                let _ = tx.send(Recorded {
                    name,
                    envelope: payload.envelope().cloned(),
                    error: payload.error().map(str::to_string),
                    attempt: payload.attempt(),
                });
            }),
        );
    }
    rx
}

/// Every lifecycle topic, named as the client names them
pub fn lifecycle_topics<K>() -> Vec<(Topic<K>, &'static str)> {
    vec![
        (Topic::Connected, "connected"),
        (Topic::Disconnected, "disconnected"),
        (Topic::Message, "message"),
        (Topic::Error, "error"),
        (Topic::Reconnecting, "reconnecting"),
        (Topic::MaxReconnectAttemptsReached, "maxReconnectAttemptsReached"),
    ]
}

/// Wait for the next event called `name`, returning it and everything skipped
pub async fn wait_for(
    rx: &mut mpsc::UnboundedReceiver<Recorded>,
    name: &str,
) -> (Recorded, Vec<Recorded>) {
    let mut skipped = Vec::new();
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    loop {
        let event = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for '{}', saw {:?}", name, skipped))
            .expect("event channel closed");
        if event.name == name {
            return (event, skipped);
        }
        skipped.push(event);
    }
}

/// Everything already recorded, without waiting
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Recorded>) -> Vec<Recorded> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn count(events: &[Recorded], name: &str) -> usize {
    events.iter().filter(|event| event.name == name).count()
}

/// Poll `condition` until it holds or the event timeout passes
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
