use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// GET /api/v1/ws -- upgrade to the live temperature feed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Pump feed frames to one dashboard until either side goes away.
///
/// The feed is one-way: outbound frames come from the manager channel, and
/// inbound traffic is only watched for Close and errors.
async fn handle_socket(mut socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "Dashboard connected");

    let mut rx = ws_manager.add(conn_id.clone()).await;

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                // None: the manager dropped us (shutdown or eviction).
                let Some(msg) = outbound else { break };
                if let Err(e) = socket.send(msg).await {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
        }
    }

    ws_manager.remove(&conn_id).await;
    tracing::info!(conn_id = %conn_id, "Dashboard disconnected");
}
