//! Bridge from the event bus to connected dashboards.
//!
//! [`FeedRelay`] subscribes to the [`EventBus`](thermowatch_events::EventBus)
//! and turns each [`FeedEvent`] into a `{"event": topic, "data": payload}`
//! text frame broadcast to every WebSocket connection.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::json;
use thermowatch_core::feed::FeedEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

pub struct FeedRelay {
    ws_manager: Arc<WsManager>,
}

impl FeedRelay {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the relay loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<FeedEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let delivered = self.ws_manager.broadcast(feed_frame(&event)).await;
                    tracing::trace!(
                        topic = event.topic.as_str(),
                        delivered,
                        "Feed event relayed"
                    );
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Feed relay lagged, dashboards missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, feed relay shutting down");
                    break;
                }
            }
        }
    }
}

/// Encode a feed event as the text frame dashboards consume.
pub fn feed_frame(event: &FeedEvent) -> Message {
    let frame = json!({
        "event": event.topic.as_str(),
        "data": event.payload,
    });
    Message::Text(frame.to_string().into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use thermowatch_core::reading::StoredReading;
    use thermowatch_events::EventBus;

    use super::*;

    fn frame_json(message: Message) -> serde_json::Value {
        match message {
            Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("expected a text frame, got {other:?}"),
        }
    }

    #[test]
    fn frame_carries_topic_and_payload() {
        let reading = StoredReading {
            id: 3,
            value: 61.5,
            observed_at: chrono::Utc::now(),
        };
        let frame = frame_json(feed_frame(&FeedEvent::new_temperature(&reading)));
        assert_eq!(frame["event"], "new-temperature");
        assert_eq!(frame["data"]["value"], 61.5);
        assert_eq!(frame["data"]["id"], 3);
    }

    #[test]
    fn error_frame_carries_message() {
        let frame = frame_json(feed_frame(&FeedEvent::error("disk full")));
        assert_eq!(frame["event"], "error");
        assert_eq!(frame["data"]["message"], "disk full");
    }

    #[tokio::test]
    async fn relays_bus_events_to_connections() {
        let bus = EventBus::default();
        let manager = Arc::new(WsManager::new());
        let mut rx = manager.add("conn-1".to_string()).await;

        let handle = tokio::spawn(FeedRelay::new(Arc::clone(&manager)).run(bus.subscribe()));
        bus.send(FeedEvent::error("sensor offline"));

        let message = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("relay should forward within timeout")
            .expect("channel open");
        assert_eq!(frame_json(message)["data"]["message"], "sensor offline");

        drop(bus);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("relay should stop once the bus closes")
            .unwrap();
    }
}
