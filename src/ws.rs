use crate::messages::ClientMessage;
use crate::rooms::ConnectionId;
use crate::state::RelayState;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Drive one WebSocket connection until either side goes away, then release
/// its room.
pub async fn run_connection(socket: WebSocket, state: Arc<RelayState>) {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "New WebSocket connection");

    let (mut sender, receiver) = socket.split();
    let mut rx = state.register(connection_id);

    // Task to forward queued server events to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            debug!(?msg, "Sending message to client");
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    warn!(%err, "Failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Task to decode client events and dispatch them
    let mut recv_task = tokio::spawn(receive_loop(receiver, connection_id, state.clone()));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.disconnect(connection_id);
    info!(%connection_id, "WebSocket connection closed");
}

async fn receive_loop(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    connection_id: ConnectionId,
    state: Arc<RelayState>,
) {
    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            debug!("Received non-text message, ignoring");
            continue;
        };

        debug!(%connection_id, raw = %text, "Received message");

        let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else {
            warn!(%connection_id, raw = %text, "Failed to parse client message");
            continue;
        };

        state.dispatch(connection_id, client_msg);
    }
}
