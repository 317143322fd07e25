//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Call sessions and the control events driving them
//! - Tenant configuration and its resolver port
//! - Orders and the order store port
//! - Notification ports (live updates, push)

pub mod call;
pub mod notification;
pub mod order;
pub mod shared;
pub mod tenant;

// Re-export commonly used types
pub use shared::{DomainError, Result};
