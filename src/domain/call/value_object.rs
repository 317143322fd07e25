//! Call value objects

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a bridged call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallPhase {
    /// Call accepted on the telephony leg, nothing resolved yet
    Init,
    /// Tenant configuration resolved (or defaulted)
    ConfigResolved,
    /// Tenant has the agent disabled; no upstream connection is made
    Rejected,
    /// Upstream connection being opened and session negotiated
    Negotiating,
    /// Both relay pumps running
    Active,
    /// A pump exited, sockets being closed
    Terminating,
    /// Both sockets closed
    Closed,
}

impl CallPhase {
    /// Check if phase transition is valid
    pub fn can_transition_to(&self, next: CallPhase) -> bool {
        use CallPhase::*;

        match (self, next) {
            (Init, ConfigResolved) => true,

            (ConfigResolved, Rejected) => true,
            (ConfigResolved, Negotiating) => true,

            // Negotiation failure tears the call down without ever going active
            (Negotiating, Active) => true,
            (Negotiating, Terminating) => true,

            (Active, Terminating) => true,
            (Terminating, Closed) => true,

            _ => false,
        }
    }
}

/// How a call ended, for logs and metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    /// Agent disabled for the tenant
    Rejected,
    /// Upstream connect or negotiation failed
    Failed(String),
    /// Relay ran and one side hung up
    Completed,
}
