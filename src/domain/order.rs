//! Orders taken over the phone

use crate::domain::shared::{OrderId, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_CUSTOMER: &str = "Unknown";
pub const PICKUP_ADDRESS: &str = "Pickup";

/// Kitchen workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Received, not started
    #[serde(rename = "recu")]
    Received,
    #[serde(rename = "en_cours")]
    InProgress,
    #[serde(rename = "termine")]
    Done,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "recu",
            OrderStatus::InProgress => "en_cours",
            OrderStatus::Done => "termine",
        }
    }
}

/// Arguments of the `create_order_tool` call as sent by the model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderToolArguments {
    #[serde(default)]
    pub order_details: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
}

impl OrderToolArguments {
    pub fn parse(arguments: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(arguments)
    }
}

/// Order about to be persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub order_details: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,
}

impl OrderDraft {
    /// Build a draft, substituting defaults for anything the model left out
    pub fn from_arguments(args: OrderToolArguments, caller_number: Option<&str>) -> Self {
        Self {
            order_details: args.order_details.unwrap_or_default(),
            customer_name: args
                .customer_name
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            customer_address: args
                .customer_address
                .unwrap_or_else(|| PICKUP_ADDRESS.to_string()),
            customer_phone: caller_number
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
        }
    }
}

/// Persisted order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub order_detail: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_draft(id: OrderId, draft: OrderDraft) -> Self {
        Self {
            id,
            status: OrderStatus::Received,
            order_detail: draft.order_details,
            customer_name: draft.customer_name,
            customer_phone: draft.customer_phone,
            address: draft.customer_address,
            created_at: Utc::now(),
        }
    }
}

/// Order store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderSink: Send + Sync {
    /// Persist a new order in `recu` status
    async fn create(&self, draft: OrderDraft) -> Result<OrderId>;
}
