//! Telephony provider leg (raw PCM over WebSocket)

pub mod downstream;
pub mod socket;

pub use downstream::DownstreamTelephonyClient;
pub use socket::{split_socket, AxumTelephonyReceiver, AxumTelephonySender};
