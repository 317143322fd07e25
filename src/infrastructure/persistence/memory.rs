//! In-memory stores used when no database is configured, and in tests

use crate::config::TenantEntry;
use crate::domain::order::{Order, OrderDraft, OrderSink};
use crate::domain::shared::{OrderId, PhoneNumber, Result};
use crate::domain::tenant::{ConfigResolver, TenantConfig};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Tenant directory keyed by the stored phone number
#[derive(Clone, Default)]
pub struct InMemoryTenantDirectory {
    tenants: Arc<RwLock<HashMap<String, TenantConfig>>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: &[TenantEntry]) -> Self {
        let tenants = entries
            .iter()
            .map(|entry| (entry.phone_number.trim().to_string(), entry.to_tenant_config()))
            .collect();
        Self {
            tenants: Arc::new(RwLock::new(tenants)),
        }
    }

    pub async fn insert(&self, phone_number: &str, tenant: TenantConfig) {
        self.tenants
            .write()
            .await
            .insert(phone_number.trim().to_string(), tenant);
    }

    pub async fn tenant_count(&self) -> usize {
        self.tenants.read().await.len()
    }
}

#[async_trait]
impl ConfigResolver for InMemoryTenantDirectory {
    async fn lookup(&self, dialed: &PhoneNumber) -> Result<Option<TenantConfig>> {
        let tenants = self.tenants.read().await;
        for candidate in dialed.candidates() {
            if let Some(tenant) = tenants.get(&candidate) {
                debug!("Tenant matched {} as {}", dialed, candidate);
                return Ok(Some(tenant.clone()));
            }
        }
        Ok(None)
    }
}

/// Order store with sequential ids starting at 1
#[derive(Clone, Default)]
pub struct InMemoryOrderSink {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderSink for InMemoryOrderSink {
    async fn create(&self, draft: OrderDraft) -> Result<OrderId> {
        let mut orders = self.orders.write().await;
        let id = OrderId::new(orders.len() as i64 + 1);
        orders.push(Order::from_draft(id, draft));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    fn entry(phone_number: &str, prompt: &str) -> TenantEntry {
        TenantEntry {
            phone_number: phone_number.to_string(),
            system_prompt: Some(prompt.to_string()),
            menu: None,
            voice: None,
            agent_enabled: true,
        }
    }

    #[tokio::test]
    async fn test_exact_match() {
        let directory = InMemoryTenantDirectory::from_entries(&[entry("+33100000000", "Pizzeria")]);
        let tenant = directory
            .lookup(&PhoneNumber::parse("+33100000000").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tenant.system_prompt.as_deref(), Some("Pizzeria"));
    }

    #[tokio::test]
    async fn test_match_with_plus_toggled() {
        let directory = InMemoryTenantDirectory::from_entries(&[
            entry("+33100000000", "Pizzeria"),
            entry("33200000000", "Sushi"),
        ]);

        let without_plus = directory
            .lookup(&PhoneNumber::parse("33100000000").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(without_plus.system_prompt.as_deref(), Some("Pizzeria"));

        let with_plus = directory
            .lookup(&PhoneNumber::parse("+33200000000").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(with_plus.system_prompt.as_deref(), Some("Sushi"));
    }

    #[tokio::test]
    async fn test_exact_match_wins_over_toggled() {
        let directory = InMemoryTenantDirectory::new();
        let bare = TenantConfig {
            system_prompt: Some("bare".to_string()),
            ..TenantConfig::default()
        };
        let plus = TenantConfig {
            system_prompt: Some("plus".to_string()),
            ..TenantConfig::default()
        };
        directory.insert("33100000000", bare).await;
        directory.insert("+33100000000", plus).await;

        let tenant = directory
            .lookup(&PhoneNumber::parse("+33100000000").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tenant.system_prompt.as_deref(), Some("plus"));
        assert_eq!(directory.tenant_count().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_number() {
        let directory = InMemoryTenantDirectory::from_entries(&[entry("+33100000000", "Pizzeria")]);
        let tenant = directory
            .lookup(&PhoneNumber::parse("+44100000000").unwrap())
            .await
            .unwrap();
        assert!(tenant.is_none());
    }

    #[tokio::test]
    async fn test_orders_get_sequential_ids() {
        let sink = InMemoryOrderSink::new();
        let draft = OrderDraft {
            order_details: "2 burgers".to_string(),
            customer_name: "Alice".to_string(),
            customer_address: "12 Main St".to_string(),
            customer_phone: "+33611111111".to_string(),
        };

        assert_eq!(sink.create(draft.clone()).await.unwrap(), OrderId::new(1));
        assert_eq!(sink.create(draft).await.unwrap(), OrderId::new(2));

        let orders = sink.orders().await;
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].status, OrderStatus::Received);
        assert_eq!(orders[0].address, "12 Main St");
    }
}
