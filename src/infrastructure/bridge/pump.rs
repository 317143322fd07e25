//! Coordination between the two relay pumps of a call

use crate::infrastructure::protocols::transport::TransportError;
use std::sync::Arc;
use tokio::sync::watch;

/// Session-wide termination flag
///
/// Whichever pump stops first triggers it; the other pump observes it while
/// waiting on its socket and stops too.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a relay pump stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The socket it reads from closed
    SourceClosed,
    /// The socket it writes to was already closed
    SinkClosed,
    /// The other pump stopped first
    Shutdown,
    Failed(TransportError),
}
