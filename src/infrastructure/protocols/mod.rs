//! Protocol implementations for the two legs of a bridged call

pub mod realtime;
pub mod telephony;
pub mod transport;

pub use transport::{
    TelephonyFrame, TelephonyReceiver, TelephonySender, TransportError, UpstreamReceiver,
    UpstreamSender,
};
