//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans every [`FeedEvent`] out to the WebSocket relay and the
//! alert mailer. Share it via `Arc<EventBus>`.

use thermowatch_core::error::CoreError;
use thermowatch_core::feed::FeedEvent;
use thermowatch_core::ingest::Publisher;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use thermowatch_core::feed::FeedEvent;
/// use thermowatch_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.send(FeedEvent::error("sensor offline"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<FeedEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send an event to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it. Zero subscribers
    /// is not an error: nobody is watching the dashboard.
    pub fn send(&self, event: FeedEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Publisher for EventBus {
    fn publish(&self, event: FeedEvent) -> Result<(), CoreError> {
        let topic = event.topic.as_str();
        let receivers = self.send(event);
        tracing::trace!(topic, receivers, "Feed event published");
        Ok(())
    }
}
