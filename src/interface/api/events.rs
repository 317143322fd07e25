//! Live order events for the dashboard
//!
//! The bridge publishes through [`EventPublisher`]; dashboard clients
//! subscribe over a WebSocket at `/ws/events`.

use crate::domain::notification::EventPublisher;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

const CHANNEL_CAPACITY: usize = 1000;

/// Event as delivered to dashboard clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Event broadcaster
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<DashboardEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBroadcaster {
    fn publish(&self, event_type: &str, payload: Value) {
        let event = DashboardEvent {
            event_type: event_type.to_string(),
            data: payload,
            timestamp: Utc::now(),
        };
        // no subscribers is fine
        if self.tx.send(event).is_err() {
            debug!("No dashboard subscribers for {} event", event_type);
        }
    }
}

/// WebSocket handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(broadcaster): State<Arc<EventBroadcaster>>,
) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<EventBroadcaster>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = broadcaster.subscribe();

    info!("Dashboard client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Dashboard client lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json)).await.is_err() {
                        debug!("Failed to send event to dashboard client");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize event: {}", e);
                }
            }
        }
    });

    // Only close matters from the client side
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("Dashboard client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let broadcaster = EventBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.publish("new_order", json!({"message": "Ordre reçu", "order_id": 5}));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "new_order");
        assert_eq!(event.data["order_id"], 5);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let broadcaster = EventBroadcaster::new();
        broadcaster.publish("new_order", json!({"order_id": 1}));
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_event_wire_format() {
        let event = DashboardEvent {
            event_type: "new_order".to_string(),
            data: json!({"order_id": 3}),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "new_order");
        assert_eq!(value["data"]["order_id"], 3);
        assert!(value["timestamp"].is_string());
    }
}
