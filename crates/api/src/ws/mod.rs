//! WebSocket infrastructure for the live temperature feed.
//!
//! Provides connection management, heartbeat monitoring, the relay from the
//! event bus to connected browsers, and the HTTP upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;
mod relay;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
pub use relay::{feed_frame, FeedRelay};
