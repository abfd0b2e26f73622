//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    create_metrics_router, init_metrics, record_dependency_call, record_generation_rejected,
    record_graph_outcome, record_http_request, record_node_visit, record_token_usage,
    PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
