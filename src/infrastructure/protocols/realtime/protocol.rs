//! Realtime speech provider wire documents
//!
//! Every document is a JSON object tagged by `type`. Audio always travels
//! base64-encoded inside a document, never as a binary frame.

use crate::config::RealtimeConfig;
use crate::domain::call::ControlEvent;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Name of the single tool declared to the model
pub const ORDER_TOOL_NAME: &str = "create_order_tool";

/// Documents sent to the provider
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientDocument {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },

    #[serde(rename = "input_audio_buffer.append")]
    InputAudioAppend { audio: String },

    #[serde(rename = "response.cancel")]
    ResponseCancel,

    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },

    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientDocument {
    pub fn append_audio(pcm: &[u8]) -> Self {
        ClientDocument::InputAudioAppend {
            audio: BASE64.encode(pcm),
        }
    }

    pub fn function_call_output(call_id: &str, output: &serde_json::Value) -> Self {
        ClientDocument::ConversationItemCreate {
            item: ConversationItem::FunctionCallOutput {
                call_id: call_id.to_string(),
                output: output.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationItem {
    FunctionCallOutput { call_id: String, output: String },
}

/// Body of the `session.update` negotiation document
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub modalities: Vec<String>,
    pub instructions: String,
    pub voice: String,
    pub input_audio_format: String,
    pub output_audio_format: String,
    pub input_audio_transcription: TranscriptionConfig,
    /// `null` disables server VAD
    pub turn_detection: Option<TurnDetection>,
    pub tools: Vec<ToolDeclaration>,
    pub tool_choice: String,
}

impl SessionConfig {
    pub fn new(instructions: String, voice: &str, settings: &RealtimeConfig) -> Self {
        let turn_detection = settings.vad.enabled.then(|| TurnDetection {
            kind: "server_vad".to_string(),
            threshold: settings.vad.threshold,
            prefix_padding_ms: settings.vad.prefix_padding_ms,
            silence_duration_ms: settings.vad.silence_duration_ms,
        });

        Self {
            modalities: vec!["text".to_string(), "audio".to_string()],
            instructions,
            voice: voice.to_string(),
            input_audio_format: settings.audio_format.clone(),
            output_audio_format: settings.audio_format.clone(),
            input_audio_transcription: TranscriptionConfig {
                model: settings.transcription_model.clone(),
            },
            turn_detection,
            tools: vec![ToolDeclaration::create_order()],
            tool_choice: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionConfig {
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnDetection {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: f32,
    pub prefix_padding_ms: u32,
    pub silence_duration_ms: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDeclaration {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDeclaration {
    pub fn create_order() -> Self {
        Self {
            kind: "function".to_string(),
            name: ORDER_TOOL_NAME.to_string(),
            description: "Submit a completed order to the restaurant system.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "order_details": {
                        "type": "string",
                        "description": "The full details of the items ordered"
                    },
                    "customer_name": {
                        "type": "string",
                        "description": "Name of the customer"
                    },
                    "customer_address": {
                        "type": "string",
                        "description": "Delivery address"
                    }
                },
                "required": ["order_details"]
            }),
        }
    }
}

/// Malformed upstream document
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document has no type")]
    MissingType,

    #[error("invalid base64 audio: {0}")]
    Audio(#[from] base64::DecodeError),
}

#[derive(Deserialize)]
struct AudioDeltaBody {
    delta: String,
}

#[derive(Deserialize)]
struct FunctionCallArgumentsDoneBody {
    call_id: String,
    name: String,
    arguments: String,
}

/// Decode one provider document into a [`ControlEvent`]
///
/// Unknown types decode to `ControlEvent::Other`; only documents that are not
/// JSON objects with a `type`, or known types with broken bodies, are errors.
pub fn decode_control_event(raw: &str) -> Result<ControlEvent, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let event_type = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_string();

    match event_type.as_str() {
        "response.audio.delta" | "response.output_audio.delta" => {
            let body: AudioDeltaBody = serde_json::from_value(value)?;
            let bytes = BASE64.decode(body.delta.as_bytes())?;
            Ok(ControlEvent::AudioDelta {
                bytes: Bytes::from(bytes),
            })
        }
        "input_audio_buffer.speech_started" => Ok(ControlEvent::SpeechStarted),
        "response.function_call_arguments.done" => {
            let body: FunctionCallArgumentsDoneBody = serde_json::from_value(value)?;
            Ok(ControlEvent::FunctionCallDone {
                call_id: body.call_id,
                name: body.name,
                arguments: body.arguments,
            })
        }
        _ => Ok(ControlEvent::Other {
            event_type,
            raw: raw.to_string(),
        }),
    }
}
