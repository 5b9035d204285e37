use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::ws::manager::WsManager;

/// Interval between heartbeat pings (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that pings every connected dashboard.
///
/// Runs until `cancel` is triggered during shutdown.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!("Heartbeat cancelled");
                    break;
                }
                _ = interval.tick() => {
                    let count = ws_manager.connection_count().await;
                    if count > 0 {
                        tracing::debug!(count, "WebSocket heartbeat ping");
                        ws_manager.ping_all().await;
                    }
                }
            }
        }
    })
}
