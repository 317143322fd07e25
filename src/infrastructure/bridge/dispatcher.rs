//! Tool call dispatch: turns the model's order tool call into a stored order

use super::error::BridgeError;
use crate::domain::call::CallContext;
use crate::domain::notification::{EventPublisher, PushNotifier, NEW_ORDER_EVENT};
use crate::domain::order::{OrderDraft, OrderSink, OrderToolArguments};
use crate::domain::shared::OrderId;
use crate::infrastructure::protocols::realtime::{ClientDocument, UpstreamWriter, ORDER_TOOL_NAME};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Collaborators the dispatcher calls out to
#[derive(Clone)]
pub struct OrderServices {
    pub orders: Arc<dyn OrderSink>,
    pub events: Arc<dyn EventPublisher>,
    pub push: Arc<dyn PushNotifier>,
}

/// What happened to one function call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not our tool
    Ignored,
    Created(OrderId),
    /// Same call id seen again; answered from the earlier order
    Replayed(OrderId),
    /// Order store failed; the model was told so
    Failed,
}

/// Handles `create_order_tool` calls for one call
pub struct ToolCallDispatcher {
    context: Arc<CallContext>,
    services: OrderServices,
    upstream: UpstreamWriter,
    timeout: Duration,
    handled: HashMap<String, OrderId>,
}

impl ToolCallDispatcher {
    pub fn new(
        context: Arc<CallContext>,
        services: OrderServices,
        upstream: UpstreamWriter,
        timeout: Duration,
    ) -> Self {
        Self {
            context,
            services,
            upstream,
            timeout,
            handled: HashMap::new(),
        }
    }

    pub async fn handle(
        &mut self,
        call_id: &str,
        name: &str,
        arguments: &str,
    ) -> Result<DispatchOutcome, BridgeError> {
        if name != ORDER_TOOL_NAME {
            debug!("Ignoring call to unknown tool {}", name);
            return Ok(DispatchOutcome::Ignored);
        }

        if let Some(order_id) = self.handled.get(call_id).copied() {
            info!("Tool call {} already produced order {}", call_id, order_id);
            self.reply(call_id, json!({"status": "success", "order_id": order_id}))
                .await?;
            return Ok(DispatchOutcome::Replayed(order_id));
        }

        let args = OrderToolArguments::parse(arguments).unwrap_or_else(|e| {
            warn!("Unreadable order tool arguments ({}), using defaults: {}", e, arguments);
            OrderToolArguments::default()
        });
        let draft = OrderDraft::from_arguments(args, self.context.caller());
        info!(
            "Creating order for {} on call {}: {}",
            draft.customer_phone, self.context.session_id, draft.order_details
        );

        match self.create_order(draft.clone()).await {
            Ok(order_id) => {
                self.handled.insert(call_id.to_string(), order_id);
                metrics::counter!("orderline_orders_created_total").increment(1);
                self.announce(order_id, &draft).await;
                self.reply(call_id, json!({"status": "success", "order_id": order_id}))
                    .await?;
                Ok(DispatchOutcome::Created(order_id))
            }
            Err(e) => {
                error!("Order for call {} not stored: {}", self.context.session_id, e);
                metrics::counter!("orderline_orders_failed_total").increment(1);
                self.reply(
                    call_id,
                    json!({"status": "error", "message": "The order could not be recorded."}),
                )
                .await?;
                Ok(DispatchOutcome::Failed)
            }
        }
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, BridgeError> {
        match timeout(self.timeout, self.services.orders.create(draft)).await {
            Ok(Ok(order_id)) => Ok(order_id),
            Ok(Err(e)) => Err(BridgeError::OrderPersist(e.to_string())),
            Err(_) => Err(BridgeError::ToolTimeout(self.timeout)),
        }
    }

    /// Live update and push; neither can fail the tool call
    async fn announce(&self, order_id: OrderId, draft: &OrderDraft) {
        self.services.events.publish(
            NEW_ORDER_EVENT,
            json!({"message": "Ordre reçu", "order_id": order_id}),
        );

        let message = format!("Order #{} from {}: {}", order_id, draft.customer_name, draft.order_details);
        match timeout(self.timeout, self.services.push.send("New order", &message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Push notification for order {} failed: {}", order_id, e),
            Err(_) => warn!("Push notification for order {} timed out", order_id),
        }
    }

    /// Function call output followed by a request to keep talking
    async fn reply(&self, call_id: &str, output: serde_json::Value) -> Result<(), BridgeError> {
        self.upstream
            .send(&ClientDocument::function_call_output(call_id, &output))
            .await?;
        self.upstream.send(&ClientDocument::ResponseCreate).await?;
        Ok(())
    }
}
