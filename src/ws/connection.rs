//! WebSocket connection loop.
//!
//! Reads subscription commands from the client and forwards matching
//! admission notifications from the bus.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{AdmissionEvent, EventId};

/// Runs the read/write loop for a single WebSocket connection until the
/// client disconnects or the bus closes.
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<AdmissionEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Some(reply) = handle_text_message(&text, &mut subs) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(reply)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !subs.matches(event.event_id()) {
                            continue;
                        }
                        let Some(json) = notification(&event) else {
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

/// Wraps an admission notification in an `event` envelope.
fn notification(event: &AdmissionEvent) -> Option<String> {
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(event_type = event.event_type_str(), error = %err, "ws payload encoding failed");
            return None;
        }
    };
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text frame from the client, returning the reply to send.
fn handle_text_message(text: &str, subs: &mut SubscriptionManager) -> Option<String> {
    let reply = match serde_json::from_str::<WsMessage>(text) {
        Err(_) => WsMessage::error(String::new(), 400, "malformed JSON"),
        Ok(msg) if msg.msg_type != WsMessageType::Command => {
            WsMessage::error(msg.id, 400, "expected a command message")
        }
        Ok(msg) => match serde_json::from_value::<WsCommand>(msg.payload) {
            Ok(command) => apply_command(msg.id, command, subs),
            Err(_) => WsMessage::error(msg.id, 404, "unknown command"),
        },
    };
    serde_json::to_string(&reply).ok()
}

fn apply_command(id: String, command: WsCommand, subs: &mut SubscriptionManager) -> WsMessage {
    match command {
        WsCommand::Subscribe { event_ids } => {
            let (ids, wildcard) = parse_ids(&event_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.follows_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { event_ids } => {
            let (ids, wildcard) = parse_ids(&event_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.follows_all(),
                }),
            )
        }
    }
}

/// Splits raw ids into parsed event ids and the wildcard flag. Entries that
/// are neither `"*"` nor a UUID are skipped.
fn parse_ids(raw: &[String]) -> (Vec<EventId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for value in raw {
        if value == "*" {
            wildcard = true;
        } else if let Ok(uuid) = value.parse::<uuid::Uuid>() {
            ids.push(EventId::from_uuid(uuid));
        }
    }
    (ids, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn command(payload: serde_json::Value) -> String {
        serde_json::json!({
            "id": "c1",
            "type": "command",
            "timestamp": chrono::Utc::now(),
            "payload": payload,
        })
        .to_string()
    }

    fn reply(text: &str, subs: &mut SubscriptionManager) -> WsMessage {
        let Some(json) = handle_text_message(text, subs) else {
            panic!("expected a reply");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("reply is not an envelope");
        };
        msg
    }

    #[test]
    fn subscribe_registers_ids() {
        let mut subs = SubscriptionManager::new();
        let id = EventId::new();
        let msg = reply(
            &command(serde_json::json!({ "command": "subscribe", "event_ids": [id.to_string(), "junk"] })),
            &mut subs,
        );
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.id, "c1");
        assert!(subs.matches(id));
        assert_eq!(subs.count(), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut subs = SubscriptionManager::new();
        let msg = reply("not json", &mut subs);
        assert_eq!(msg.msg_type, WsMessageType::Error);
    }

    #[test]
    fn unknown_command_is_an_error() {
        let mut subs = SubscriptionManager::new();
        let msg = reply(
            &command(serde_json::json!({ "command": "swap" })),
            &mut subs,
        );
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload.get("code"), Some(&serde_json::json!(404)));
    }

    #[test]
    fn parse_ids_detects_wildcard() {
        let id = EventId::new();
        let (ids, wildcard) = parse_ids(&["*".to_string(), id.to_string()]);
        assert!(wildcard);
        assert_eq!(ids, vec![id]);
    }
}
