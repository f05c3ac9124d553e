//! WebSocket stream of ledger events
//!
//! Each connected client receives every `LedgerEvent` as a JSON text frame.

use crate::api::handlers::ApiState;
use crate::events::EventBroadcaster;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> impl IntoResponse {
    let address = state.ledger.read().await.address().to_string();
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, address))
}

/// Welcome frame sent on connect
fn welcome_message(address: &str) -> String {
    serde_json::json!({
        "type": "Connected",
        "data": { "address": address },
    })
    .to_string()
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, broadcaster: EventBroadcaster, address: String) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = broadcaster.subscribe();

    let _ = sender
        .send(Message::Text(welcome_message(&address).into()))
        .await;

    // Forward broadcast events to this client
    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    match event.index() {
                        Some(index) => log::debug!(
                            "Forwarding {} for transaction {}",
                            event.type_name(),
                            index
                        ),
                        None => log::debug!("Forwarding {}", event.type_name()),
                    }
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("WebSocket client lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Drain incoming frames until the client closes
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    log::debug!("Ignoring client message: {}", text);
                }
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    log::info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LedgerEvent;

    #[test]
    fn test_welcome_message() {
        let msg = welcome_message("3abc");
        let value: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(value["type"], "Connected");
        assert_eq!(value["data"]["address"], "3abc");
    }

    #[test]
    fn test_event_frame_format() {
        let json = serde_json::to_string(&LedgerEvent::TransactionExecuted { index: 4 }).unwrap();
        assert_eq!(json, r#"{"type":"TransactionExecuted","data":{"index":4}}"#);
    }
}
