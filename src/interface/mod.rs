//! Interface layer - External interfaces
//!
//! This layer handles the telephony provider webhooks, the audio stream
//! WebSocket, dashboard event streaming and metrics exposition.

pub mod api;
