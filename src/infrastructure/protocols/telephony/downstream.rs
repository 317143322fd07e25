//! Telephony → upstream pump

use crate::domain::call::CallContext;
use crate::infrastructure::bridge::pump::{PumpExit, ShutdownSignal};
use crate::infrastructure::protocols::realtime::{ClientDocument, UpstreamWriter};
use crate::infrastructure::protocols::transport::{TelephonyFrame, TelephonyReceiver, TransportError};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Relays the caller's audio to the speech provider
///
/// Frames are forwarded as-is, base64-wrapped in append documents, in the
/// order they arrive. The codec was fixed at negotiation time.
pub struct DownstreamTelephonyClient {
    context: Arc<CallContext>,
    upstream: UpstreamWriter,
}

impl DownstreamTelephonyClient {
    pub fn new(context: Arc<CallContext>, upstream: UpstreamWriter) -> Self {
        Self { context, upstream }
    }

    /// Run until the caller hangs up, a socket fails, or the other pump stops
    pub async fn relay_to_upstream<R>(&self, telephony: &mut R, shutdown: &ShutdownSignal) -> PumpExit
    where
        R: TelephonyReceiver + ?Sized,
    {
        let exit = self.pump(telephony, shutdown).await;
        shutdown.trigger();
        exit
    }

    async fn pump<R>(&self, telephony: &mut R, shutdown: &ShutdownSignal) -> PumpExit
    where
        R: TelephonyReceiver + ?Sized,
    {
        let session_id = self.context.session_id;

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.triggered() => return PumpExit::Shutdown,
                next = telephony.recv() => next,
            };

            match next {
                Ok(Some(TelephonyFrame::Audio(pcm))) if pcm.is_empty() => {
                    info!("Empty frame from caller on call {}, ending relay", session_id);
                    return PumpExit::SourceClosed;
                }
                Ok(Some(TelephonyFrame::Audio(pcm))) => {
                    match self.upstream.send(&ClientDocument::append_audio(&pcm)).await {
                        Ok(()) => {}
                        Err(TransportError::PeerClosed) => {
                            info!("Realtime leg of call {} already closed", session_id);
                            return PumpExit::SinkClosed;
                        }
                        Err(e) => {
                            error!("Failed to forward caller audio on call {}: {}", session_id, e);
                            return PumpExit::Failed(e);
                        }
                    }
                }
                Ok(Some(TelephonyFrame::Text(text))) => {
                    debug!("Dropping text frame from telephony provider: {}", text);
                }
                Ok(None) => {
                    info!("Caller hung up on call {}", session_id);
                    return PumpExit::SourceClosed;
                }
                Err(e) => {
                    error!("Telephony read failed on call {}: {}", session_id, e);
                    return PumpExit::Failed(e);
                }
            }
        }
    }
}
