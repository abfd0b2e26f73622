//! Application state shared by handlers

use std::sync::Arc;

use crate::config::UiConfig;
use crate::domain::TokenVerifier;
use crate::infrastructure::graph::CorrectiveRagGraph;
use crate::infrastructure::retrieval::LazyPassageRetriever;

/// Application state; every field is cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    pub graph: CorrectiveRagGraph,
    pub verifier: Arc<dyn TokenVerifier>,
    pub ui: Arc<UiConfig>,
    /// Shared retrieval client, reported by the readiness probe
    pub retrieval: Option<Arc<LazyPassageRetriever>>,
}

impl AppState {
    pub fn new(graph: CorrectiveRagGraph, verifier: Arc<dyn TokenVerifier>, ui: UiConfig) -> Self {
        Self {
            graph,
            verifier,
            ui: Arc::new(ui),
            retrieval: None,
        }
    }

    pub fn with_retrieval(mut self, retrieval: Arc<LazyPassageRetriever>) -> Self {
        self.retrieval = Some(retrieval);
        self
    }
}
