//! WebSocket handler for live booking updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use bookcast_core::{ClientIntent, HubHandle, ObserverId};
use futures::{sink::SinkExt, stream::StreamExt};
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut observer = match state.hub.connect().await {
        Ok(observer) => observer,
        Err(e) => {
            error!(error = %e, "Rejecting WebSocket client");
            return;
        }
    };
    let observer_id = observer.id;
    let (mut sender, mut receiver) = socket.split();

    info!(observer = %observer_id, "WebSocket client connected");

    // Forward hub events to this client; the snapshot is always first.
    let shutdown = state.shutdown.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!(observer = %observer_id, "Server shutting down, closing WebSocket");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
                event = observer.events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!(observer = %observer_id, error = %e, "Failed to encode event");
                    continue;
                }
            };
            debug!(observer = %observer_id, kind = event.kind(), "Sending event to WebSocket client");
            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!(observer = %observer_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    let hub = state.hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => handle_text(&hub, observer_id, text.as_str()).await,
                Ok(Message::Close(_)) => {
                    debug!(observer = %observer_id, "WebSocket client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(observer = %observer_id, error = %e, "WebSocket receive failed");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.disconnect(observer_id).await;
    info!(observer = %observer_id, "WebSocket client disconnected");
}

async fn handle_text(hub: &HubHandle, observer: ObserverId, text: &str) {
    match ClientIntent::parse(text) {
        Ok(ClientIntent::Confirm { id }) => {
            debug!(observer = %observer, booking_id = %id, "Received confirm intent");
            if let Err(e) = hub.confirm(observer, id).await {
                warn!(observer = %observer, error = %e, "Could not queue confirm intent");
            }
        }
        Err(e) => warn!(observer = %observer, error = %e, "Ignoring malformed client message"),
    }
}
