//! Push notification delivery

use crate::domain::notification::PushNotifier;
use crate::domain::shared::Result;
use async_trait::async_trait;
use tracing::info;

/// Notifier that only logs; stands in until a push provider is configured
#[derive(Debug, Clone, Default)]
pub struct TracingPushNotifier;

impl TracingPushNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PushNotifier for TracingPushNotifier {
    async fn send(&self, title: &str, message: &str) -> Result<()> {
        info!(target: "orderline::push", title, "{}", message);
        Ok(())
    }
}
