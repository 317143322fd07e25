//! Upstream speech client: negotiation and the upstream → telephony pump

use super::connector::UpstreamConnector;
use super::protocol::{decode_control_event, ClientDocument, SessionConfig};
use crate::domain::call::{CallContext, ControlEvent};
use crate::infrastructure::bridge::dispatcher::ToolCallDispatcher;
use crate::infrastructure::bridge::error::BridgeError;
use crate::infrastructure::bridge::pump::{PumpExit, ShutdownSignal};
use crate::infrastructure::protocols::transport::{
    TelephonySender, TransportError, UpstreamReceiver, UpstreamSender,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Single writer for the upstream socket
///
/// The upstream pump and the tool dispatcher both send documents; the lock
/// keeps each document whole on the wire.
#[derive(Clone)]
pub struct UpstreamWriter {
    inner: Arc<Mutex<WriterState>>,
}

struct WriterState {
    sender: Box<dyn UpstreamSender>,
    closed: bool,
}

impl UpstreamWriter {
    pub fn new(sender: Box<dyn UpstreamSender>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WriterState {
                sender,
                closed: false,
            })),
        }
    }

    pub async fn send(&self, document: &ClientDocument) -> Result<(), TransportError> {
        let text = document
            .to_json()
            .map_err(|e| TransportError::Io(format!("failed to encode document: {}", e)))?;

        let mut state = self.inner.lock().await;
        if state.closed {
            return Err(TransportError::PeerClosed);
        }
        state.sender.send_text(text).await
    }

    /// Close the upstream socket; later calls are no-ops
    pub async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.inner.lock().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;
        state.sender.close().await
    }
}

/// Owner of the upstream socket for one call
pub struct UpstreamSpeechClient {
    context: Arc<CallContext>,
    writer: UpstreamWriter,
    receiver: Box<dyn UpstreamReceiver>,
}

impl UpstreamSpeechClient {
    pub async fn connect(
        connector: &dyn UpstreamConnector,
        context: Arc<CallContext>,
    ) -> Result<Self, BridgeError> {
        let connection = connector.connect().await?;
        Ok(Self {
            context,
            writer: UpstreamWriter::new(connection.sender),
            receiver: connection.receiver,
        })
    }

    pub fn writer(&self) -> &UpstreamWriter {
        &self.writer
    }

    /// Send the `session.update` document
    pub async fn negotiate(&mut self, session: SessionConfig) -> Result<(), BridgeError> {
        debug!(
            "Negotiating realtime session for call {} (voice {})",
            self.context.session_id, session.voice
        );
        self.writer
            .send(&ClientDocument::SessionUpdate { session })
            .await
            .map_err(|e| BridgeError::Negotiation(e.to_string()))
    }

    /// Relay provider events to the caller until either side stops
    pub async fn relay_to_telephony<S>(
        &mut self,
        telephony: &mut S,
        dispatcher: &mut ToolCallDispatcher,
        shutdown: &ShutdownSignal,
    ) -> PumpExit
    where
        S: TelephonySender + ?Sized,
    {
        let exit = self.pump(telephony, dispatcher, shutdown).await;
        shutdown.trigger();
        exit
    }

    async fn pump<S>(
        &mut self,
        telephony: &mut S,
        dispatcher: &mut ToolCallDispatcher,
        shutdown: &ShutdownSignal,
    ) -> PumpExit
    where
        S: TelephonySender + ?Sized,
    {
        let session_id = self.context.session_id;

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.triggered() => return PumpExit::Shutdown,
                next = self.receiver.recv_text() => next,
            };

            let raw = match next {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    info!("Realtime provider closed call {}", session_id);
                    return PumpExit::SourceClosed;
                }
                Err(TransportError::PeerClosed) => return PumpExit::SourceClosed,
                Err(e) => {
                    error!("Realtime read failed on call {}: {}", session_id, e);
                    return PumpExit::Failed(e);
                }
            };

            let event = match decode_control_event(&raw).map_err(BridgeError::from) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping document on call {}: {}", session_id, e);
                    continue;
                }
            };

            match event {
                ControlEvent::AudioDelta { bytes } => match telephony.send_audio(bytes).await {
                    Ok(()) => {}
                    Err(TransportError::PeerClosed) => {
                        info!("Telephony leg of call {} already closed", session_id);
                        return PumpExit::SinkClosed;
                    }
                    Err(e) => {
                        error!("Failed to send audio to caller on call {}: {}", session_id, e);
                        return PumpExit::Failed(e);
                    }
                },
                ControlEvent::SpeechStarted => {
                    debug!("Caller barged in on call {}, cancelling response", session_id);
                    metrics::counter!("orderline_barge_ins_total").increment(1);
                    if let Err(e) = self.writer.send(&ClientDocument::ResponseCancel).await {
                        warn!("Failed to cancel response on call {}: {}", session_id, e);
                    }
                }
                ControlEvent::FunctionCallDone {
                    call_id,
                    name,
                    arguments,
                } => {
                    if let Err(e) = dispatcher.handle(&call_id, &name, &arguments).await {
                        warn!("Tool call {} on call {} not answered: {}", call_id, session_id, e);
                    }
                }
                ControlEvent::Other { event_type, raw } => {
                    if event_type == "error" {
                        warn!("Realtime provider error on call {}: {}", session_id, raw);
                    } else {
                        debug!("Ignoring realtime event {}", event_type);
                    }
                }
            }
        }
    }
}
