//! PostgreSQL order store over the dashboard's `orders` table

use crate::domain::order::{OrderDraft, OrderSink, OrderStatus};
use crate::domain::shared::{DomainError, OrderId, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, error};

pub struct PgOrderSink {
    pool: PgPool,
}

impl PgOrderSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderSink for PgOrderSink {
    async fn create(&self, draft: OrderDraft) -> Result<OrderId> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders
            (status, order_detail, customer_name, customer_phone, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id::BIGINT
            "#,
        )
        .bind(OrderStatus::Received.as_str())
        .bind(&draft.order_details)
        .bind(&draft.customer_name)
        .bind(&draft.customer_phone)
        .bind(&draft.customer_address)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to insert order: {}", e);
            DomainError::Storage(format!("Database error: {}", e))
        })?;

        debug!("Created order {}", id);
        Ok(OrderId::new(id))
    }
}
