//! Socket abstractions shared by the telephony and realtime legs
//!
//! Each leg is split into a receiving half and a sending half so the two relay
//! pumps can own what they read from while writing to the other side.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Socket failure, split by whether the peer simply went away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Remote side already closed; ends a pump gracefully
    #[error("peer closed the connection")]
    PeerClosed,

    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Classify an I/O failure by its kind
    pub fn from_io(error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::UnexpectedEof => TransportError::PeerClosed,
            _ => TransportError::Io(error.to_string()),
        }
    }

    /// Classify a socket error from its source chain
    ///
    /// An `io::Error` anywhere in the chain decides by kind. Otherwise only the
    /// websocket library's closed-connection messages count as a peer close.
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        let mut current = Some(error);
        while let Some(err) = current {
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                return TransportError::from_io(io);
            }
            current = err.source();
        }

        let text = error.to_string();
        let lower = text.to_ascii_lowercase();
        if lower.contains("connection closed") || lower.contains("closed connection") {
            TransportError::PeerClosed
        } else {
            TransportError::Io(text)
        }
    }
}

/// Frame received from the telephony provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelephonyFrame {
    /// Raw PCM samples
    Audio(Bytes),
    /// Text frame; carries nothing the bridge acts on
    Text(String),
}

/// Receiving half of the telephony socket
#[async_trait]
pub trait TelephonyReceiver: Send {
    /// Next frame; `Ok(None)` once the provider closed the socket
    async fn recv(&mut self) -> Result<Option<TelephonyFrame>, TransportError>;
}

/// Sending half of the telephony socket
#[async_trait]
pub trait TelephonySender: Send {
    async fn send_audio(&mut self, pcm: Bytes) -> Result<(), TransportError>;

    /// Close the socket; closing twice is a no-op
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Receiving half of the realtime provider socket
#[async_trait]
pub trait UpstreamReceiver: Send {
    /// Next JSON control document; `Ok(None)` once the provider closed
    async fn recv_text(&mut self) -> Result<Option<String>, TransportError>;
}

/// Sending half of the realtime provider socket
#[async_trait]
pub trait UpstreamSender: Send {
    async fn send_text(&mut self, document: String) -> Result<(), TransportError>;

    /// Close the socket; closing twice is a no-op
    async fn close(&mut self) -> Result<(), TransportError>;
}
