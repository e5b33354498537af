//! Kitchen monitor
//!
//! Connects to the kitchen socket, keeps an order board up to date and logs
//! what changes. Requests a station snapshot every time the socket opens.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use kitchen_display::bin_common::{load_kitchen_config, ConfigType};
use kitchen_display::kitchen::{
    init_tracing, KitchenChannel, KitchenKind, OrderBoard, ShutdownSignal,
};
use kitchen_display::realtime::{listener, Topic};
use serde_json::Value;
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// What the socket listeners hand to the board thread
enum BoardEvent {
    Envelope(KitchenKind, Value),
    Stop,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = load_kitchen_config(ConfigType::Kitchen).context("loading kitchen config")?;
    init_tracing(&config.log_level);

    let shutdown = ShutdownSignal::new();
    shutdown.spawn_signal_handler();

    let channel = KitchenChannel::new(&config.realtime).context("building kitchen channel")?;

    let (board_tx, board_rx) = crossbeam_channel::unbounded();
    let board_thread = thread::Builder::new()
        .name("order-board".to_string())
        .spawn(move || run_board(board_rx))
        .context("spawning board thread")?;

    for kind in KitchenKind::ALL {
        let board_tx = board_tx.clone();
        channel.on(
            Topic::Kind(kind),
            listener(move |payload| {
                if let Some(envelope) = payload.envelope() {
                    let _ = board_tx.send(BoardEvent::Envelope(kind, envelope.clone()));
                }
            }),
        );
    }

    let (opened_tx, mut opened_rx) = mpsc::unbounded_channel();
    channel.on(
        Topic::Connected,
        listener(move |_| {
            let _ = opened_tx.send(());
        }),
    );
    channel.on(
        Topic::Reconnecting,
        listener(|payload| {
            if let Some(attempt) = payload.attempt() {
                info!(attempt, "Kitchen socket reconnecting");
            }
        }),
    );
    channel.on(
        Topic::Error,
        listener(|payload| {
            warn!(error = payload.error().unwrap_or("unknown"), "Kitchen socket error");
        }),
    );
    {
        let shutdown = shutdown.clone();
        channel.on(
            Topic::MaxReconnectAttemptsReached,
            listener(move |_| {
                warn!("Kitchen socket gave up reconnecting, stopping");
                shutdown.trigger();
            }),
        );
    }

    info!("Starting kitchen monitor on {}", channel.url());
    info!("Press Ctrl+C to stop");
    channel.connect();

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            opened = opened_rx.recv() => {
                if opened.is_none() {
                    break;
                }
                if !channel.request_station_status() {
                    warn!("Station status request dropped");
                }
            }
        }
    }

    channel.disconnect();
    stop_board(&board_tx);
    if board_thread.join().is_err() {
        warn!("Board thread panicked");
    }

    let metrics = channel.metrics();
    info!(
        received = metrics.messages_received,
        sent = metrics.messages_sent,
        parse_failures = metrics.parse_failures,
        reconnects = metrics.reconnect_count,
        "Shutdown complete"
    );
    Ok(())
}

fn stop_board(board_tx: &Sender<BoardEvent>) {
    let _ = board_tx.send(BoardEvent::Stop);
}

fn run_board(rx: Receiver<BoardEvent>) {
    let mut board = OrderBoard::new();
    info!("Order board thread started");

    while let Ok(event) = rx.recv() {
        match event {
            BoardEvent::Envelope(kind, envelope) => {
                if !board.apply(kind, &envelope) {
                    continue;
                }
                match kind {
                    KitchenKind::NewOrder | KitchenKind::OrderUpdate => {
                        let order_id = envelope.get("orderId").map(Value::to_string);
                        info!(
                            %kind,
                            order = order_id.as_deref().unwrap_or("?"),
                            open_orders = board.len(),
                            "Order board updated"
                        );
                    }
                    KitchenKind::StationUpdate | KitchenKind::StaffUpdate => {
                        info!(%kind, "Snapshot updated");
                    }
                }
            }
            BoardEvent::Stop => break,
        }
    }

    info!(orders = board.len(), "Order board thread stopped");
}
