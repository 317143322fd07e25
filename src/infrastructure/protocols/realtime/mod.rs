//! Realtime speech provider leg

pub mod client;
pub mod connector;
pub mod protocol;

pub use client::{UpstreamSpeechClient, UpstreamWriter};
pub use connector::{RealtimeConnector, UpstreamConnection, UpstreamConnector};
pub use protocol::{decode_control_event, ClientDocument, SessionConfig, ORDER_TOOL_NAME};
