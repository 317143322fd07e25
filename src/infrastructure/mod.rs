//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - The voice bridge and its relay pumps
//! - Realtime provider and telephony protocol clients
//! - Tenant directory and order store implementations
//! - Push notification delivery

pub mod bridge;
pub mod notify;
pub mod persistence;
pub mod protocols;
