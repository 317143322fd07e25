//! PostgreSQL tenant directory over the dashboard's `users` table

use crate::domain::shared::{DomainError, PhoneNumber, Result};
use crate::domain::tenant::{ConfigResolver, TenantConfig};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};

#[derive(FromRow)]
struct TenantRow {
    system_prompt: Option<String>,
    menu: Option<String>,
    voice: Option<String>,
    agent_on: Option<bool>,
}

impl From<TenantRow> for TenantConfig {
    fn from(r: TenantRow) -> Self {
        TenantConfig {
            system_prompt: r.system_prompt,
            menu: r.menu,
            voice: r.voice,
            // a NULL flag means the agent was never switched off
            agent_enabled: r.agent_on.unwrap_or(true),
        }
    }
}

pub struct PgTenantDirectory {
    pool: PgPool,
}

impl PgTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<TenantConfig>> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT system_prompt, menu, voice, agent_on
            FROM users
            WHERE phone_number = $1
            LIMIT 1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to look up tenant {}: {}", phone_number, e);
            DomainError::Storage(format!("Database error: {}", e))
        })?;

        Ok(row.map(TenantConfig::from))
    }
}

#[async_trait]
impl ConfigResolver for PgTenantDirectory {
    async fn lookup(&self, dialed: &PhoneNumber) -> Result<Option<TenantConfig>> {
        for candidate in dialed.candidates() {
            if let Some(tenant) = self.find_by_phone(&candidate).await? {
                debug!("Tenant matched {} as {}", dialed, candidate);
                return Ok(Some(tenant));
            }
        }
        Ok(None)
    }
}
