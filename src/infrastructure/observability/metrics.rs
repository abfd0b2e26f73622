//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;
use crate::domain::{GraphNode, Usage};

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("static regex")
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("static regex"));

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("crag_chat_service_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

pub fn record_node_visit(node: GraphNode) {
    counter!("crag_node_visits_total", "node" => node.as_str()).increment(1);
}

/// Latency and failures of calls to retrieval, completion and web search
pub fn record_dependency_call(service: &'static str, duration: Duration, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!("crag_dependency_calls_total", "service" => service, "status" => status)
        .increment(1);
    histogram!("crag_dependency_call_duration_seconds", "service" => service)
        .record(duration.as_secs_f64());
}

/// Tokens billed for one classifier completion
pub fn record_token_usage(chain: &'static str, usage: Usage) {
    counter!("crag_completion_tokens_total", "chain" => chain, "kind" => "prompt")
        .increment(u64::from(usage.prompt_tokens));
    counter!("crag_completion_tokens_total", "chain" => chain, "kind" => "completion")
        .increment(u64::from(usage.completion_tokens));
}

/// Grade assigned to each rejected generation
pub fn record_generation_rejected(grade: &'static str) {
    counter!("crag_generations_rejected_total", "grade" => grade).increment(1);
}

/// Terminal state of one request: `useful`, `exhausted`, `error` or `cancelled`
pub fn record_graph_outcome(outcome: &'static str, regenerations: u32) {
    counter!("crag_graph_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("crag_regenerations", "outcome" => outcome).record(f64::from(regenerations));
}

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_uuid() {
        let path = "/chat/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(sanitize_path(path), "/chat/{id}");
    }

    #[test]
    fn test_sanitize_path_numeric_id() {
        assert_eq!(sanitize_path("/resources/123/items"), "/resources/{id}/items");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        assert_eq!(sanitize_path("/health"), "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        assert!(sanitize_path(path).len() <= 50);
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_node_visit(GraphNode::Retrieve);
        record_dependency_call("retrieval", Duration::from_millis(12), true);
        record_graph_outcome("useful", 0);
    }

    #[test]
    fn test_token_usage_counters() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_token_usage(
                "answer_grader",
                Usage {
                    prompt_tokens: 120,
                    completion_tokens: 4,
                },
            );
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"crag_completion_tokens_total{chain="answer_grader",kind="prompt"} 120"#));
        assert!(
            rendered.contains(r#"crag_completion_tokens_total{chain="answer_grader",kind="completion"} 4"#)
        );
    }
}
