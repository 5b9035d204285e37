//! Unit tests for `WsManager`.
//!
//! These exercise the connection manager directly, without performing any
//! HTTP upgrades.

use axum::extract::ws::Message;
use thermowatch_api::ws::WsManager;

// ---------------------------------------------------------------------------
// Test: add() and remove() track the connection count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_track_connection_count() {
    let manager = WsManager::new();
    assert_eq!(manager.connection_count().await, 0);

    let _rx1 = manager.add("conn-1".to_string()).await;
    let _rx2 = manager.add("conn-2".to_string()).await;
    assert_eq!(manager.connection_count().await, 2);

    manager.remove("conn-1").await;
    manager.remove("nonexistent").await;
    assert_eq!(manager.connection_count().await, 1);
}

// ---------------------------------------------------------------------------
// Test: broadcast() reaches every open connection and reports the count
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_reaches_open_connections_only() {
    let manager = WsManager::new();

    let closed = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;
    let mut rx3 = manager.add("conn-3".to_string()).await;
    drop(closed);

    let delivered = manager
        .broadcast(Message::Text(r#"{"event":"new-temperature"}"#.into()))
        .await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx2, &mut rx3] {
        let msg = rx.recv().await.expect("open connection should receive");
        assert!(matches!(&msg, Message::Text(t) if t.as_str().contains("new-temperature")));
    }
}

// ---------------------------------------------------------------------------
// Test: ping_all() sends a Ping frame
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ping_all_sends_ping() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string()).await;

    manager.ping_all().await;

    let msg = rx.recv().await.expect("should receive ping");
    assert!(matches!(msg, Message::Ping(_)), "Expected Ping, got: {msg:?}");
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears all connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let manager = WsManager::new();

    let mut rx1 = manager.add("conn-1".to_string()).await;
    let mut rx2 = manager.add("conn-2".to_string()).await;

    manager.shutdown_all().await;

    assert_eq!(manager.connection_count().await, 0);

    for rx in [&mut rx1, &mut rx2] {
        let msg = rx.recv().await.expect("should receive Close");
        assert!(
            matches!(msg, Message::Close(None)),
            "Expected Close(None), got: {msg:?}"
        );
        assert!(rx.recv().await.is_none(), "Channel should be closed after shutdown");
    }
}
