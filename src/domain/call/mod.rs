//! Call bounded context - one phone call bridged to the voice agent

pub mod event;
pub mod session;
pub mod value_object;

pub use event::ControlEvent;
pub use session::{CallContext, CallSession};
pub use value_object::{CallOutcome, CallPhase};
