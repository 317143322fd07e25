//! API Router configuration

use super::events::{ws_handler, EventBroadcaster};
use super::metrics_handler::metrics_handler;
use super::voice_handler::{answer_call, call_event, voice_stream, AppState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
///
/// `/metrics` is only mounted when a Prometheus handle is given.
pub fn build_router(
    state: AppState,
    prometheus_handle: Option<PrometheusHandle>,
    event_broadcaster: Arc<EventBroadcaster>,
) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    let voice_routes = Router::new()
        .route("/webhooks/answer", get(answer_call).post(answer_call))
        .route("/webhooks/event", post(call_event))
        .route("/voice/stream", get(voice_stream))
        .with_state(state);

    let ws_routes = Router::new()
        .route("/ws/events", get(ws_handler))
        .with_state(event_broadcaster);

    let mut router = Router::new()
        .merge(health_routes)
        .merge(voice_routes)
        .merge(ws_routes);

    if let Some(handle) = prometheus_handle {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(handle);
        router = router.merge(metrics_routes);
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok", "service": env!("CARGO_PKG_NAME")}))
}
