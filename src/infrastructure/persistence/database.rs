//! Database connection management

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Create a new database connection pool
///
/// The tables are owned by the dashboard; no migrations run from here.
pub async fn create_pool(url: &str, config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!("Connecting to {}", mask_password(url));
    info!("Max connections: {}", config.max_connections);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(Some(IDLE_TIMEOUT))
        .connect(url)
        .await?;

    info!("Database connection pool ready");
    Ok(pool)
}

/// Mask password in database URL for logging
pub fn mask_password(url: &str) -> String {
    let start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let authority_end = url[start..].find('/').map(|i| start + i).unwrap_or(url.len());

    if let Some(at_pos) = url[start..authority_end].rfind('@').map(|i| start + i) {
        if let Some(colon_pos) = url[start..at_pos].find(':').map(|i| start + i) {
            let mut masked = url.to_string();
            masked.replace_range(colon_pos + 1..at_pos, "****");
            return masked;
        }
    }
    url.to_string()
}
