//! Control events received from the speech provider

use bytes::Bytes;

/// Upstream control document, decoded
///
/// The set is closed; anything the bridge has no use for lands in `Other`
/// so new provider event types never break the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Chunk of synthesized audio, already base64-decoded
    AudioDelta { bytes: Bytes },
    /// Server VAD detected the caller speaking (barge-in)
    SpeechStarted,
    /// Model finished emitting the arguments of a function call
    FunctionCallDone {
        call_id: String,
        name: String,
        arguments: String,
    },
    /// Any other event type
    Other { event_type: String, raw: String },
}

impl ControlEvent {
    /// Event type name, for logs
    pub fn kind(&self) -> &str {
        match self {
            ControlEvent::AudioDelta { .. } => "audio_delta",
            ControlEvent::SpeechStarted => "speech_started",
            ControlEvent::FunctionCallDone { .. } => "function_call_done",
            ControlEvent::Other { event_type, .. } => event_type,
        }
    }
}
