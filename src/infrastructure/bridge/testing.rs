//! In-memory sockets and collaborators for bridge tests

use crate::domain::notification::{EventPublisher, PushNotifier};
use crate::domain::shared::{DomainError, Result as DomainResult};
use crate::infrastructure::bridge::error::BridgeError;
use crate::infrastructure::protocols::realtime::{UpstreamConnection, UpstreamConnector};
use crate::infrastructure::protocols::transport::{
    TelephonyFrame, TelephonyReceiver, TelephonySender, TransportError, UpstreamReceiver,
    UpstreamSender,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Everything written to either socket, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Wire {
    Upstream(String),
    UpstreamClosed,
    Telephony(Bytes),
    TelephonyClosed,
}

#[derive(Debug, Clone, Default)]
pub struct WireLog(Arc<Mutex<Vec<Wire>>>);

impl WireLog {
    pub fn push(&self, wire: Wire) {
        self.0.lock().unwrap().push(wire);
    }

    pub fn entries(&self) -> Vec<Wire> {
        self.0.lock().unwrap().clone()
    }

    pub fn upstream_documents(&self) -> Vec<Value> {
        self.entries()
            .into_iter()
            .filter_map(|wire| match wire {
                Wire::Upstream(text) => Some(serde_json::from_str(&text).unwrap()),
                _ => None,
            })
            .collect()
    }

    pub fn upstream_types(&self) -> Vec<String> {
        self.upstream_documents()
            .iter()
            .map(|doc| doc["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Decoded payloads of every `input_audio_buffer.append` sent upstream
    pub fn appended_audio(&self) -> Vec<Vec<u8>> {
        self.upstream_documents()
            .iter()
            .filter(|doc| doc["type"] == "input_audio_buffer.append")
            .map(|doc| BASE64.decode(doc["audio"].as_str().unwrap()).unwrap())
            .collect()
    }

    pub fn telephony_frames(&self) -> Vec<Bytes> {
        self.entries()
            .into_iter()
            .filter_map(|wire| match wire {
                Wire::Telephony(pcm) => Some(pcm),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, expected: &Wire) -> usize {
        self.entries().iter().filter(|wire| *wire == expected).count()
    }
}

pub struct RecordingUpstreamSender {
    log: WireLog,
    closed: bool,
    fail_with: Option<TransportError>,
}

impl RecordingUpstreamSender {
    pub fn new(log: WireLog) -> Self {
        Self {
            log,
            closed: false,
            fail_with: None,
        }
    }

    pub fn failing(log: WireLog, error: TransportError) -> Self {
        Self {
            log,
            closed: false,
            fail_with: Some(error),
        }
    }
}

#[async_trait]
impl UpstreamSender for RecordingUpstreamSender {
    async fn send_text(&mut self, document: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::PeerClosed);
        }
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.log.push(Wire::Upstream(document));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.closed {
            self.closed = true;
            self.log.push(Wire::UpstreamClosed);
        }
        Ok(())
    }
}

pub struct ChannelUpstreamReceiver(mpsc::UnboundedReceiver<String>);

#[async_trait]
impl UpstreamReceiver for ChannelUpstreamReceiver {
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.0.recv().await)
    }
}

pub struct RecordingTelephonySender {
    log: WireLog,
    closed: bool,
}

impl RecordingTelephonySender {
    pub fn new(log: WireLog) -> Self {
        Self { log, closed: false }
    }
}

#[async_trait]
impl TelephonySender for RecordingTelephonySender {
    async fn send_audio(&mut self, pcm: Bytes) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::PeerClosed);
        }
        self.log.push(Wire::Telephony(pcm));
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.closed {
            self.closed = true;
            self.log.push(Wire::TelephonyClosed);
        }
        Ok(())
    }
}

pub struct ChannelTelephonyReceiver(mpsc::UnboundedReceiver<Result<TelephonyFrame, TransportError>>);

#[async_trait]
impl TelephonyReceiver for ChannelTelephonyReceiver {
    async fn recv(&mut self) -> Result<Option<TelephonyFrame>, TransportError> {
        match self.0.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

/// Upstream socket whose inbound documents are fed by the test
pub fn upstream_pair(log: &WireLog) -> (UpstreamConnection, mpsc::UnboundedSender<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UpstreamConnection {
            sender: Box::new(RecordingUpstreamSender::new(log.clone())),
            receiver: Box::new(ChannelUpstreamReceiver(rx)),
        },
        tx,
    )
}

/// Upstream socket that accepts the connection but fails every write
pub fn failing_upstream_pair(
    log: &WireLog,
    error: TransportError,
) -> (UpstreamConnection, mpsc::UnboundedSender<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UpstreamConnection {
            sender: Box::new(RecordingUpstreamSender::failing(log.clone(), error)),
            receiver: Box::new(ChannelUpstreamReceiver(rx)),
        },
        tx,
    )
}

/// Telephony socket whose inbound frames are fed by the test
pub fn telephony_pair(
    log: &WireLog,
) -> (
    RecordingTelephonySender,
    ChannelTelephonyReceiver,
    mpsc::UnboundedSender<Result<TelephonyFrame, TransportError>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        RecordingTelephonySender::new(log.clone()),
        ChannelTelephonyReceiver(rx),
        tx,
    )
}

/// Connector handing out one prepared connection
pub struct FakeConnector {
    connection: Mutex<Option<UpstreamConnection>>,
    attempts: AtomicUsize,
}

impl FakeConnector {
    pub fn new(connection: UpstreamConnection) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Every connect attempt is refused
    pub fn refusing() -> Self {
        Self {
            connection: Mutex::new(None),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamConnector for FakeConnector {
    async fn connect(&self) -> Result<UpstreamConnection, BridgeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.connection
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BridgeError::UpstreamConnect("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<(String, Value)>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event_type: &str, payload: Value) {
        self.events
            .lock()
            .unwrap()
            .push((event_type.to_string(), payload));
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushNotifier for RecordingNotifier {
    async fn send(&self, title: &str, message: &str) -> DomainResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        if self.fail {
            return Err(DomainError::Notification("push service unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn audio_delta(pcm: &[u8]) -> String {
    serde_json::json!({"type": "response.audio.delta", "delta": BASE64.encode(pcm)}).to_string()
}

pub fn speech_started() -> String {
    r#"{"type":"input_audio_buffer.speech_started","audio_start_ms":0}"#.to_string()
}

pub fn function_call_done(call_id: &str, name: &str, arguments: &str) -> String {
    serde_json::json!({
        "type": "response.function_call_arguments.done",
        "call_id": call_id,
        "name": name,
        "arguments": arguments,
    })
    .to_string()
}
