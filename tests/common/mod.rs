//! Shared fixtures for the router tests

#![allow(dead_code)]

use async_trait::async_trait;
use orderline::config::{RealtimeConfig, ServerConfig, TelephonyConfig, TenantEntry};
use orderline::infrastructure::bridge::{BridgeError, BridgeServices, OrderServices};
use orderline::infrastructure::notify::TracingPushNotifier;
use orderline::infrastructure::persistence::{InMemoryOrderSink, InMemoryTenantDirectory};
use orderline::infrastructure::protocols::realtime::{UpstreamConnection, UpstreamConnector};
use orderline::infrastructure::protocols::transport::{
    TransportError, UpstreamReceiver, UpstreamSender,
};
use orderline::interface::api::{AppState, EventBroadcaster};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const DIALED: &str = "+33100000000";
pub const CALLER: &str = "+33611111111";

/// Upstream socket as seen from the test: what the bridge sent, and a way to
/// push provider events back
pub struct ScriptedUpstream {
    pub sent: mpsc::UnboundedReceiver<String>,
    pub events: mpsc::UnboundedSender<String>,
}

struct ChannelSender(mpsc::UnboundedSender<String>);

#[async_trait]
impl UpstreamSender for ChannelSender {
    async fn send_text(&mut self, document: String) -> Result<(), TransportError> {
        self.0.send(document).map_err(|_| TransportError::PeerClosed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

struct ChannelReceiver(mpsc::UnboundedReceiver<String>);

#[async_trait]
impl UpstreamReceiver for ChannelReceiver {
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.0.recv().await)
    }
}

/// Hands out a single scripted connection
pub struct ScriptedConnector {
    connection: Mutex<Option<UpstreamConnection>>,
}

impl ScriptedConnector {
    pub fn new() -> (Self, ScriptedUpstream) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let connection = UpstreamConnection {
            sender: Box::new(ChannelSender(sent_tx)),
            receiver: Box::new(ChannelReceiver(events_rx)),
        };
        (
            Self {
                connection: Mutex::new(Some(connection)),
            },
            ScriptedUpstream {
                sent: sent_rx,
                events: events_tx,
            },
        )
    }
}

#[async_trait]
impl UpstreamConnector for ScriptedConnector {
    async fn connect(&self) -> Result<UpstreamConnection, BridgeError> {
        self.connection
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BridgeError::UpstreamConnect("already used".to_string()))
    }
}

pub fn tenants() -> Vec<TenantEntry> {
    vec![
        TenantEntry {
            phone_number: DIALED.to_string(),
            system_prompt: Some("You take orders for Chez Paul.".to_string()),
            menu: Some("Burger 9.50\nFries 3.00".to_string()),
            voice: Some("sage".to_string()),
            agent_enabled: true,
        },
        TenantEntry {
            phone_number: "+33199999999".to_string(),
            system_prompt: None,
            menu: None,
            voice: None,
            agent_enabled: false,
        },
    ]
}

pub struct TestApp {
    pub state: AppState,
    pub orders: InMemoryOrderSink,
    pub broadcaster: Arc<EventBroadcaster>,
}

pub fn test_app(connector: Arc<dyn UpstreamConnector>) -> TestApp {
    let orders = InMemoryOrderSink::new();
    let broadcaster = Arc::new(EventBroadcaster::new());
    let bridge = BridgeServices {
        resolver: Arc::new(InMemoryTenantDirectory::from_entries(&tenants())),
        connector,
        orders: OrderServices {
            orders: Arc::new(orders.clone()),
            events: broadcaster.clone(),
            push: Arc::new(TracingPushNotifier::new()),
        },
        realtime: RealtimeConfig::default(),
    };
    let state = AppState {
        bridge,
        server: ServerConfig {
            public_url: "orders.example.test".to_string(),
            ..ServerConfig::default()
        },
        telephony: TelephonyConfig::default(),
    };
    TestApp {
        state,
        orders,
        broadcaster,
    }
}
