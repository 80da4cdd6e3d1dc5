//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching subscription commands and forwarding filtered audit events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{PoolSelection, SubscriptionManager};
use crate::domain::PoolEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<PoolEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(pool_event) => {
                        if !subs.matches(pool_event.pool_id()) {
                            continue;
                        }
                        let Some(json) = event_message(&pool_event) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps an audit event in an `event` envelope.
fn event_message(pool_event: &PoolEvent) -> Option<String> {
    let payload = serde_json::to_value(pool_event).ok()?;
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text message from the client, returning an optional JSON response.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };
    if msg.msg_type != WsMessageType::Command {
        return serde_json::to_string(&WsMessage::error(msg.id, 400, "expected a command")).ok();
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let payload = match command {
        WsCommand::Subscribe { pool_ids } => {
            let selection = PoolSelection::parse(&pool_ids);
            subs.subscribe(&selection);
            serde_json::json!({
                "subscribed": selection.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "rejected": selection.rejected,
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::Unsubscribe { pool_ids } => {
            let selection = PoolSelection::parse(&pool_ids);
            subs.unsubscribe(&selection);
            serde_json::json!({
                "unsubscribed": selection.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
    };

    serde_json::to_string(&WsMessage::new(msg.id, WsMessageType::Response, payload)).ok()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{LedgerEvent, PoolId, PositionId};

    fn respond(text: &str, subs: &mut SubscriptionManager) -> serde_json::Value {
        let Some(json) = handle_text_message(text, subs) else {
            panic!("expected a response");
        };
        let Ok(value) = serde_json::from_str(&json) else {
            panic!("response is JSON");
        };
        value
    }

    #[test]
    fn subscribe_command_updates_manager() {
        let mut subs = SubscriptionManager::new();
        let pool_id = PoolId::new();
        let text = serde_json::json!({
            "id": "req-1",
            "type": "command",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": { "command": "subscribe", "pool_ids": [pool_id.to_string()] }
        })
        .to_string();

        let response = respond(&text, &mut subs);
        assert_eq!(response["id"], "req-1");
        assert_eq!(response["type"], "response");
        assert_eq!(response["payload"]["count"], 1);
        assert!(subs.matches(pool_id));
    }

    #[test]
    fn malformed_json_yields_error() {
        let mut subs = SubscriptionManager::new();
        let response = respond("{not json", &mut subs);
        assert_eq!(response["type"], "error");
        assert_eq!(response["payload"]["code"], 400);
    }

    #[test]
    fn unknown_command_yields_not_found() {
        let mut subs = SubscriptionManager::new();
        let text = serde_json::json!({
            "id": "req-2",
            "type": "command",
            "timestamp": "2026-01-01T00:00:00Z",
            "payload": { "command": "get_state", "pool_id": "x" }
        })
        .to_string();
        let response = respond(&text, &mut subs);
        assert_eq!(response["payload"]["code"], 404);
    }

    #[test]
    fn event_envelope_carries_record() {
        let pool_id = PoolId::new();
        let event = PoolEvent::new(
            pool_id,
            LedgerEvent::Burned {
                position_id: PositionId::new(3),
            },
        );
        let Some(json) = event_message(&event) else {
            panic!("serializable");
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&json) else {
            panic!("valid JSON");
        };
        assert_eq!(value["type"], "event");
        assert_eq!(value["payload"]["event_type"], "burned");
        assert_eq!(value["payload"]["event_name"], "BurnEvent");
        assert_eq!(value["payload"]["pool_id"], pool_id.to_string());
    }
}
