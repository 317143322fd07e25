//! Orderline - phone ordering agent
//!
//! Bridges a telephony provider's audio WebSocket to a realtime speech model,
//! cancels the model's reply when the caller talks over it, and turns the
//! model's `create_order_tool` calls into stored orders.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::error::Result;
