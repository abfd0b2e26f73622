//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use super::types::Json;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus, message: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.map(str::to_string),
        }
    }
}

/// Returns 200 whenever the process is serving
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Reports local component state without calling out to dependencies.
/// Degraded still answers 200; only a closed retrieval client fails the probe.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let checks = vec![
        check_retrieval(&state).await,
        check_web_search(&state),
    ];

    let overall_status = checks
        .iter()
        .map(|check| check.status)
        .fold(HealthStatus::Healthy, worst);

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn worst(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    use HealthStatus::*;
    match (a, b) {
        (Unhealthy, _) | (_, Unhealthy) => Unhealthy,
        (Degraded, _) | (_, Degraded) => Degraded,
        _ => Healthy,
    }
}

async fn check_retrieval(state: &AppState) -> HealthCheck {
    let Some(retrieval) = &state.retrieval else {
        return HealthCheck::new("retrieval", HealthStatus::Healthy, None);
    };

    if retrieval.is_closed().await {
        HealthCheck::new("retrieval", HealthStatus::Unhealthy, Some("shutting down"))
    } else if retrieval.is_initialized().await {
        HealthCheck::new("retrieval", HealthStatus::Healthy, None)
    } else {
        HealthCheck::new("retrieval", HealthStatus::Healthy, Some("connects on first request"))
    }
}

fn check_web_search(state: &AppState) -> HealthCheck {
    if state.graph.web_search_degraded() {
        HealthCheck::new(
            "web_search",
            HealthStatus::Degraded,
            Some("no search credential configured; web fallback returns documents unchanged"),
        )
    } else {
        HealthCheck::new("web_search", HealthStatus::Healthy, None)
    }
}
