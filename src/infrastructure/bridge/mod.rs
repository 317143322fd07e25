//! Voice bridge between the telephony leg and the realtime speech provider
//!
//! One [`CallSessionController`] per call owns both sockets, runs the two
//! relay pumps and routes tool calls through the [`ToolCallDispatcher`].

pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod pump;

#[cfg(test)]
pub mod testing;

pub use controller::{serve_call, BridgeServices, CallSessionController};
pub use dispatcher::{DispatchOutcome, OrderServices, ToolCallDispatcher};
pub use error::BridgeError;
pub use pump::{PumpExit, ShutdownSignal};
