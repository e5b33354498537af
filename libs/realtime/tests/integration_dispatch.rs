//! Integration tests for inbound frame dispatch over a live socket

mod common;

use common::*;
use realtime::{listener, ConnectionState, RealtimeClient, Topic};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn client_for(url: &str) -> RealtimeClient<TestRouter> {
    RealtimeClient::builder()
        .url(url)
        .router(TestRouter)
        .fixed_delay(Duration::from_millis(50), 5)
        .build()
        .unwrap()
}

fn all_topics() -> Vec<(Topic<TestKind>, &'static str)> {
    let mut topics = lifecycle_topics();
    topics.push((Topic::Kind(TestKind::NewOrder), "newOrder"));
    topics.push((Topic::Kind(TestKind::OrderUpdate), "orderUpdate"));
    topics
}

#[tokio::test]
async fn test_known_kind_follows_message() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());
    let mut events = record(&client, all_topics());

    client.connect();
    wait_for(&mut events, "connected").await;

    server.push(r#"{"type":"order_update","orderId":"42","status":"ready"}"#);

    let (message, _) = wait_for(&mut events, "message").await;
    let (update, skipped) = wait_for(&mut events, "orderUpdate").await;
    assert!(skipped.is_empty());

    let expected = json!({"type": "order_update", "orderId": "42", "status": "ready"});
    assert_eq!(message.envelope, Some(expected.clone()));
    assert_eq!(update.envelope, Some(expected));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count(&drain(&mut events), "newOrder"), 0);
}

#[tokio::test]
async fn test_frames_arrive_in_wire_order() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());
    let mut events = record(&client, vec![(Topic::Connected, "connected"), (Topic::Message, "message")]);

    client.connect();
    wait_for(&mut events, "connected").await;

    for seq in 0..25 {
        server.push(format!(r#"{{"type":"new_order","orderId":"{}"}}"#, seq));
    }

    let mut seen = Vec::new();
    for _ in 0..25 {
        let (event, _) = wait_for(&mut events, "message").await;
        seen.push(event.envelope.unwrap()["orderId"].as_str().unwrap().to_string());
    }
    let expected: Vec<String> = (0..25).map(|seq| seq.to_string()).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_malformed_frames_reach_nobody() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());
    let mut events = record(&client, all_topics());

    client.connect();
    wait_for(&mut events, "connected").await;

    server.push("this is not json");
    server.push(r#"{"type":"new_order""#);
    server.push(r#"{"type":"new_order","orderId":"7"}"#);

    let (message, skipped) = wait_for(&mut events, "message").await;
    assert!(skipped.is_empty(), "unexpected events {:?}", skipped);
    assert_eq!(message.envelope.unwrap()["orderId"], "7");
    wait_for(&mut events, "newOrder").await;

    assert_eq!(client.metrics().parse_failures, 2);
    assert_eq!(client.metrics().messages_received, 3);
    assert!(client.is_open());
}

#[tokio::test]
async fn test_unknown_type_emits_only_message() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());
    let mut events = record(&client, all_topics());

    client.connect();
    wait_for(&mut events, "connected").await;

    server.push(r#"{"type":"staff_update","staff":[]}"#);
    server.push(r#"{"type":"new_order","orderId":"1"}"#);

    wait_for(&mut events, "newOrder").await;
    let names: Vec<_> = drain(&mut events).iter().map(|e| e.name).collect();
    assert!(names.is_empty(), "unexpected trailing events {:?}", names);
}

#[tokio::test]
async fn test_off_stops_delivery() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());
    let mut events = record(&client, vec![(Topic::Connected, "connected"), (Topic::Message, "message")]);

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = {
        let hits = Arc::clone(&hits);
        listener(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };
    client.on(Topic::Kind(TestKind::NewOrder), counter.clone());
    client.on(Topic::Kind(TestKind::NewOrder), counter.clone());
    assert_eq!(client.listener_count(&Topic::Kind(TestKind::NewOrder)), 2);

    client.connect();
    wait_for(&mut events, "connected").await;

    server.push(r#"{"type":"new_order","orderId":"1"}"#);
    wait_for(&mut events, "message").await;
    assert!(eventually(|| hits.load(Ordering::SeqCst) == 2).await);

    assert!(client.off(&Topic::Kind(TestKind::NewOrder), &counter));
    server.push(r#"{"type":"new_order","orderId":"2"}"#);
    wait_for(&mut events, "message").await;
    assert!(eventually(|| hits.load(Ordering::SeqCst) == 3).await);

    assert!(client.off(&Topic::Kind(TestKind::NewOrder), &counter));
    assert!(!client.off(&Topic::Kind(TestKind::NewOrder), &counter));
    server.push(r#"{"type":"new_order","orderId":"3"}"#);
    wait_for(&mut events, "message").await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_panicking_listener_does_not_stall_client() {
    let server = MockWsServer::start().await;
    let client = client_for(&server.ws_url());

    client.on(Topic::Message, listener(|_| panic!("listener bug")));
    let mut events = record(&client, all_topics());

    client.connect();
    wait_for(&mut events, "connected").await;

    server.push(r#"{"type":"new_order","orderId":"1"}"#);
    wait_for(&mut events, "message").await;
    wait_for(&mut events, "newOrder").await;

    // Still open and still sending
    assert_eq!(client.connection_state(), ConnectionState::Open);
    assert!(client.send(&json!({"type": "request_station_status"})));
    assert!(eventually(|| server.received().len() == 1).await);

    // And still reconnecting after a transport loss
    server.kick_all();
    wait_for(&mut events, "disconnected").await;
    wait_for(&mut events, "connected").await;
    assert!(client.is_open());
    assert_eq!(server.accepted(), 2);

    server.push(r#"{"type":"order_update","orderId":"1"}"#);
    wait_for(&mut events, "orderUpdate").await;
}
