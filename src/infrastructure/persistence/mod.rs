//! Tenant directory and order store implementations

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;
#[cfg(feature = "postgres")]
pub mod order_repository;
#[cfg(feature = "postgres")]
pub mod tenant_repository;

pub use memory::{InMemoryOrderSink, InMemoryTenantDirectory};

#[cfg(feature = "postgres")]
pub use database::{create_pool, mask_password};
#[cfg(feature = "postgres")]
pub use order_repository::PgOrderSink;
#[cfg(feature = "postgres")]
pub use tenant_repository::PgTenantDirectory;
