//! Bridge errors

use crate::domain::DomainError;
use crate::infrastructure::protocols::realtime::protocol::ProtocolError;
use crate::infrastructure::protocols::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Failures of one bridged call
///
/// None of these escape the call: the controller logs them and hangs up.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Upstream connection failed: {0}")]
    UpstreamConnect(String),

    #[error("Session negotiation failed: {0}")]
    Negotiation(String),

    #[error("Malformed upstream document: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Relay I/O failure: {0}")]
    PumpIo(#[from] TransportError),

    #[error("Order could not be stored: {0}")]
    OrderPersist(String),

    #[error("Tool call timed out after {0:?}")]
    ToolTimeout(Duration),

    #[error("Invalid call state: {0}")]
    State(#[from] DomainError),
}
