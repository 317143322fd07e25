use orderline::config::Config;
use orderline::domain::order::OrderSink;
use orderline::domain::tenant::ConfigResolver;
use orderline::infrastructure::bridge::{BridgeServices, OrderServices};
use orderline::infrastructure::notify::TracingPushNotifier;
use orderline::infrastructure::persistence::{InMemoryOrderSink, InMemoryTenantDirectory};
use orderline::infrastructure::protocols::realtime::RealtimeConnector;
use orderline::interface::api::{build_router, init_metrics, AppState, EventBroadcaster};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "postgres")]
use orderline::infrastructure::persistence::{create_pool, PgOrderSink, PgTenantDirectory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    info!("Starting Orderline voice bridge");

    let config = Config::load()?;
    info!("Server: {:?}", config.server);
    info!("Realtime: {:?}", config.realtime);

    if config.realtime.api_key.is_none() {
        warn!("No realtime API key configured; upstream connections will be refused");
    }

    let (resolver, orders) = build_stores(&config).await?;

    let event_broadcaster = Arc::new(EventBroadcaster::new());
    let bridge = BridgeServices {
        resolver,
        connector: Arc::new(RealtimeConnector::new(&config.realtime)),
        orders: OrderServices {
            orders,
            events: event_broadcaster.clone(),
            push: Arc::new(TracingPushNotifier::new()),
        },
        realtime: config.realtime.clone(),
    };

    let prometheus_handle = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let state = AppState {
        bridge,
        server: config.server.clone(),
        telephony: config.telephony.clone(),
    };
    let app = build_router(state, prometheus_handle, event_broadcaster);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Listening on {} (public url {})", address, config.server.public_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Orderline stopped");
    Ok(())
}

type Stores = (Arc<dyn ConfigResolver>, Arc<dyn OrderSink>);

#[cfg(feature = "postgres")]
async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    if let Some(url) = &config.database.url {
        let pool = create_pool(url, &config.database).await?;
        info!("Using PostgreSQL tenant directory and order store");
        return Ok((
            Arc::new(PgTenantDirectory::new(pool.clone())),
            Arc::new(PgOrderSink::new(pool)),
        ));
    }
    Ok(memory_stores(config))
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(config: &Config) -> anyhow::Result<Stores> {
    if config.database.url.is_some() {
        warn!("Built without the postgres feature; ignoring database.url");
    }
    Ok(memory_stores(config))
}

fn memory_stores(config: &Config) -> Stores {
    info!("Using in-memory stores with {} configured tenants", config.tenants.len());
    (
        Arc::new(InMemoryTenantDirectory::from_entries(&config.tenants)),
        Arc::new(InMemoryOrderSink::new()),
    )
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
