//! Prometheus metrics handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and describe the bridge metrics
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

pub fn describe_metrics() {
    describe_counter!("orderline_calls_total", "Total number of calls received on the stream endpoint");
    describe_counter!(
        "orderline_calls_rejected_total",
        "Calls refused because the tenant's agent is disabled"
    );
    describe_counter!("orderline_orders_created_total", "Orders stored from tool calls");
    describe_counter!(
        "orderline_orders_failed_total",
        "Tool calls whose order could not be stored"
    );
    describe_counter!(
        "orderline_barge_ins_total",
        "Responses cancelled because the caller started speaking"
    );
    describe_gauge!("orderline_active_calls", "Number of calls currently bridged");
}

/// HTTP metrics handler
pub async fn metrics_handler(State(prometheus_handle): State<PrometheusHandle>) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}
