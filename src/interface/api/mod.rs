//! HTTP and WebSocket endpoints

pub mod events;
pub mod metrics_handler;
pub mod router;
pub mod voice_handler;

pub use events::{DashboardEvent, EventBroadcaster};
pub use metrics_handler::{describe_metrics, init_metrics};
pub use router::build_router;
pub use voice_handler::AppState;
