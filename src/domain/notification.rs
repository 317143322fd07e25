//! Outbound notification ports

use crate::domain::shared::Result;
use async_trait::async_trait;

/// Event type published when the voice agent records an order
pub const NEW_ORDER_EVENT: &str = "new_order";

/// Live-update channel feeding the dashboard
///
/// Fire-and-forget: publishing never fails from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event_type: &str, payload: serde_json::Value);
}

/// Push notifications to the restaurant staff
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn send(&self, title: &str, message: &str) -> Result<()>;
}
