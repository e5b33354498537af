use crate::builder::{states::*, RealtimeClientBuilder};
use crate::config::ClientConfig;
use crate::connection_state::{
    AtomicConnectionState, AtomicMetrics, AtomicReconnectPhase, ConnectionState, Metrics,
    ReconnectPhase,
};
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::traits::*;
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, ReentrantMutex};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One `connect()`-initiated driver lifetime
///
/// Retiring a session (dropping it from `Shared::session` and signalling
/// `shutdown_tx`) is what cancels its socket and any pending retry.
struct Session {
    id: u64,
    shutdown_tx: watch::Sender<bool>,
    outbound_tx: mpsc::UnboundedSender<String>,
}

impl Session {
    fn retire(self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// State shared between the client handle and its driver task
struct Shared<R: EnvelopeRouter> {
    config: ClientConfig,
    dispatcher: Dispatcher<R>,
    state: AtomicConnectionState,
    phase: AtomicReconnectPhase,
    retry_count: AtomicUsize,
    metrics: AtomicMetrics,
    session: Mutex<Option<Session>>,
    next_session_id: AtomicU64,
    /// Held while announcing `connected` or `disconnect()`'s `disconnected`,
    /// so listeners see the two in the order the state changed. Taken before
    /// `session`, never after.
    lifecycle: ReentrantMutex<()>,
}

impl<R: EnvelopeRouter> Shared<R> {
    /// Run `transition` only if `id` is still the live session
    ///
    /// Holding the session lock while mutating serializes driver transitions
    /// with `connect()`/`disconnect()`, so a retired driver can never touch
    /// state again.
    fn if_current(&self, id: u64, transition: impl FnOnce()) -> bool {
        let session = self.session.lock();
        if session.as_ref().map(|s| s.id) != Some(id) {
            return false;
        }
        transition();
        true
    }

    fn emit(&self, topic: Topic<R::Kind>, payload: EventPayload<'_>) {
        self.dispatcher.emit(&topic, payload);
    }
}

/// How a live connection ended
enum LoopExit {
    /// The session was retired by the caller
    ShutdownRequested,
    /// The peer sent a close frame
    ClosedByPeer,
}

/// Reconnecting WebSocket client with a listener registry
///
/// - `connect()` starts a session: a tokio task that owns the socket,
///   dispatches inbound frames in wire order and reconnects after unexpected
///   closes according to the [`ReconnectionStrategy`]
/// - `disconnect()` retires the session; nothing it scheduled runs afterwards
/// - `send()` writes only while the socket is open and never buffers
///
/// Dropping the client retires its session without emitting events.
///
/// # Type Parameters
/// - `R`: EnvelopeRouter deciding which envelopes get a kind-specific event
pub struct RealtimeClient<R: EnvelopeRouter> {
    shared: Arc<Shared<R>>,
}

impl RealtimeClient<MessageOnly> {
    /// Start building a client; the router chosen on the builder fixes `R`
    pub fn builder() -> RealtimeClientBuilder<NoUrl, NoRouter, ()> {
        RealtimeClientBuilder::new()
    }
}

impl<R: EnvelopeRouter> RealtimeClient<R> {
    pub(crate) fn new(config: ClientConfig, router: R) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                dispatcher: Dispatcher::new(router),
                state: AtomicConnectionState::new(ConnectionState::Disconnected),
                phase: AtomicReconnectPhase::new(ReconnectPhase::Idle),
                retry_count: AtomicUsize::new(0),
                metrics: AtomicMetrics::new(),
                session: Mutex::new(None),
                next_session_id: AtomicU64::new(1),
                lifecycle: ReentrantMutex::new(()),
            }),
        }
    }

    /// Open the connection unless it is already open or connecting
    ///
    /// Resets the retry counter. A pending scheduled retry is cancelled and
    /// replaced by an immediate attempt. Must be called inside a tokio runtime.
    pub fn connect(&self) {
        let shared = &self.shared;
        let mut session = shared.session.lock();

        if shared.state.is_open() || shared.state.is_connecting() {
            debug!(state = ?shared.state.get(), "connect() ignored, connection already active");
            return;
        }

        if let Some(previous) = session.take() {
            previous.retire();
        }

        let id = shared.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        shared.retry_count.store(0, Ordering::Release);
        shared.state.set(ConnectionState::Connecting);
        shared.phase.set(ReconnectPhase::Connecting);
        *session = Some(Session {
            id,
            shutdown_tx,
            outbound_tx,
        });
        drop(session);

        info!(url = %shared.config.url(), session = id, "Connecting");
        tokio::spawn(run_session(
            Arc::clone(shared),
            id,
            shutdown_rx,
            outbound_rx,
        ));
    }

    /// Close the connection and stop reconnecting
    ///
    /// Safe to call in any state. Emits `disconnected` if the socket was open.
    pub fn disconnect(&self) {
        let shared = &self.shared;
        let _lifecycle = shared.lifecycle.lock();
        let (retired, previous) = {
            let mut session = shared.session.lock();
            let retired = session.take();
            let previous = shared.state.get();
            if retired.is_some() {
                shared.state.set(ConnectionState::Closed);
            }
            shared.phase.set(ReconnectPhase::Idle);
            (retired, previous)
        };

        let Some(session) = retired else {
            debug!("disconnect() without an active session");
            return;
        };

        info!(url = %shared.config.url(), session = session.id, "Disconnecting");
        session.retire();

        if previous == ConnectionState::Open {
            shared.emit(Topic::Disconnected, EventPayload::Empty);
        }
    }

    /// Serialize `payload` as JSON and send it if the socket is open
    ///
    /// Returns `false` (and logs) when the message was dropped: socket not
    /// open, or the payload failed to serialize. Nothing is queued for later.
    pub fn send<T>(&self, payload: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        match serde_json::to_string(payload) {
            Ok(text) => self.send_text(text),
            Err(e) => {
                let e = RealtimeError::from(e);
                error!(error = %e, "Dropping outbound message");
                self.shared.metrics.increment_dropped();
                false
            }
        }
    }

    fn send_text(&self, text: String) -> bool {
        let shared = &self.shared;
        let accepted = {
            let session = shared.session.lock();
            match session.as_ref() {
                Some(session) if shared.state.is_open() => session.outbound_tx.send(text).is_ok(),
                _ => false,
            }
        };

        if !accepted {
            warn!(state = ?shared.state.get(), "Socket not open, dropping outbound message");
            shared.metrics.increment_dropped();
        }
        accepted
    }

    /// Subscribe `listener` to `topic`
    pub fn on(&self, topic: Topic<R::Kind>, listener: Listener) {
        self.shared.dispatcher.registry().add(topic, listener);
    }

    /// Remove the first registration of `listener` under `topic`
    pub fn off(&self, topic: &Topic<R::Kind>, listener: &Listener) -> bool {
        self.shared.dispatcher.registry().remove(topic, listener)
    }

    pub fn listener_count(&self, topic: &Topic<R::Kind>) -> usize {
        self.shared.dispatcher.registry().listener_count(topic)
    }

    #[inline]
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.state.get()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.shared.state.is_open()
    }

    #[inline]
    pub fn reconnect_phase(&self) -> ReconnectPhase {
        self.shared.phase.get()
    }

    /// Reconnect attempts since the last successful open
    #[inline]
    pub fn retry_count(&self) -> usize {
        self.shared.retry_count.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> Metrics {
        self.shared.metrics.snapshot(self.shared.state.get())
    }

    pub fn url(&self) -> &str {
        self.shared.config.url()
    }

    pub fn router(&self) -> &R {
        self.shared.dispatcher.router()
    }
}

impl<R: EnvelopeRouter> Drop for RealtimeClient<R> {
    fn drop(&mut self) {
        if let Some(session) = self.shared.session.lock().take() {
            session.retire();
        }
    }
}

/// Driver task for one session
async fn run_session<R: EnvelopeRouter>(
    shared: Arc<Shared<R>>,
    id: u64,
    mut shutdown_rx: watch::Receiver<bool>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
) {
    loop {
        let connecting = shared.if_current(id, || {
            shared.state.set(ConnectionState::Connecting);
            shared.phase.set(ReconnectPhase::Connecting);
        });
        if !connecting {
            break;
        }

        let attempt = tokio::select! {
            result = connect_async(shared.config.url()) => result,
            _ = shutdown_rx.changed() => {
                debug!(session = id, "Session retired while connecting");
                break;
            }
        };

        match attempt {
            Ok((socket, _response)) => {
                let opened = {
                    let _lifecycle = shared.lifecycle.lock();
                    let opened = shared.if_current(id, || {
                        shared.state.set(ConnectionState::Open);
                        shared.phase.set(ReconnectPhase::Connected);
                        shared.retry_count.store(0, Ordering::Release);
                    });
                    if opened {
                        info!(url = %shared.config.url(), session = id, "Connected");
                        shared.emit(Topic::Connected, EventPayload::Empty);
                    }
                    opened
                };
                if !opened {
                    break;
                }

                let exit = connection_loop(&shared, socket, &mut shutdown_rx, &mut outbound_rx).await;
                match exit {
                    Ok(LoopExit::ShutdownRequested) => break,
                    Ok(LoopExit::ClosedByPeer) => {
                        info!(url = %shared.config.url(), "Connection closed by peer");
                    }
                    Err(e) => {
                        error!(error = %e, "Connection lost");
                        shared.emit(Topic::Error, EventPayload::Error(&e.to_string()));
                    }
                }
            }
            Err(e) => {
                let e = RealtimeError::WebSocket(e.to_string());
                error!(url = %shared.config.url(), error = %e, "Failed to connect");
                shared.emit(Topic::Error, EventPayload::Error(&e.to_string()));
            }
        }

        if !shared.if_current(id, || shared.state.set(ConnectionState::Closed)) {
            break;
        }

        // Whatever was queued for the lost socket is dropped, never resent
        let mut discarded = 0;
        while outbound_rx.try_recv().is_ok() {
            shared.metrics.increment_dropped();
            discarded += 1;
        }
        if discarded > 0 {
            warn!(discarded, "Discarded outbound messages queued for a closed socket");
        }

        shared.emit(Topic::Disconnected, EventPayload::Empty);

        let attempts = shared.retry_count.load(Ordering::Acquire);
        let Some(delay) = shared.config.reconnect_strategy().next_delay(attempts) else {
            if shared.if_current(id, || shared.phase.set(ReconnectPhase::Exhausted)) {
                warn!(attempts, "Reconnect attempts exhausted, giving up");
                shared.emit(Topic::MaxReconnectAttemptsReached, EventPayload::Empty);
            }
            break;
        };

        let scheduled = shared.if_current(id, || {
            shared.phase.set(ReconnectPhase::RetryScheduled);
            shared.retry_count.store(attempts + 1, Ordering::Release);
            shared.metrics.increment_reconnects();
        });
        if !scheduled {
            break;
        }

        info!(
            delay_ms = delay.as_millis() as u64,
            attempt = attempts + 1,
            "Reconnect scheduled"
        );
        shared.emit(Topic::Reconnecting, EventPayload::Attempt(attempts + 1));

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => {
                debug!(session = id, "Scheduled retry cancelled");
                break;
            }
        }
    }

    debug!(session = id, "Session driver exiting");
}

/// Pump one open socket until it closes or the session is retired
async fn connection_loop<R: EnvelopeRouter>(
    shared: &Shared<R>,
    socket: Socket,
    shutdown_rx: &mut watch::Receiver<bool>,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<LoopExit> {
    let (mut write, mut read) = socket.split();

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("Session retired, closing socket");
                let _ = write.send(Message::Close(None)).await;
                let _ = write.close().await;
                return Ok(LoopExit::ShutdownRequested);
            }

            outbound = outbound_rx.recv() => {
                let Some(text) = outbound else {
                    return Ok(LoopExit::ShutdownRequested);
                };
                write
                    .send(Message::Text(text))
                    .await
                    .map_err(|e| RealtimeError::WebSocket(e.to_string()))?;
                shared.metrics.increment_sent();
            }

            frame = read.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        shared.metrics.increment_received();
                        dispatch(shared, &text);
                    }
                    Some(Ok(Message::Binary(data))) => {
                        shared.metrics.increment_received();
                        match String::from_utf8(data) {
                            Ok(text) => dispatch(shared, &text),
                            Err(_) => {
                                warn!("Dropping non UTF-8 binary frame");
                                shared.metrics.increment_parse_failures();
                            }
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        debug!(?frame, "Close frame received");
                        return Ok(LoopExit::ClosedByPeer);
                    }
                    Some(Ok(_)) => {
                        // ping/pong; tungstenite answers pings on its own
                    }
                    Some(Err(e)) => {
                        return Err(RealtimeError::WebSocket(e.to_string()));
                    }
                    None => {
                        return Err(RealtimeError::ConnectionClosed("stream ended".into()));
                    }
                }
            }
        }
    }
}

fn dispatch<R: EnvelopeRouter>(shared: &Shared<R>, text: &str) {
    if matches!(shared.dispatcher.dispatch_text(text), DispatchOutcome::Malformed) {
        shared.metrics.increment_parse_failures();
    }
}
