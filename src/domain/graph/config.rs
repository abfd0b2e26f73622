//! Graph execution settings

use serde::{Deserialize, Serialize};

/// Configuration for one graph instance, shared by every request it runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Maximum GENERATE re-entries before the request fails
    #[serde(default = "default_max_regenerations")]
    pub max_regenerations: u32,
    /// Concurrent relevance calls while grading documents
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,
    /// Capacity of the per-request event channel
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
    /// Description of the indexed corpus, used by the router prompt
    #[serde(default = "default_corpus_description")]
    pub corpus_description: String,
}

fn default_max_regenerations() -> u32 {
    3
}

fn default_grading_concurrency() -> usize {
    4
}

fn default_stream_buffer() -> usize {
    32
}

fn default_corpus_description() -> String {
    "the documents uploaded by the organisation: internal policies, product manuals and \
     technical reports"
        .to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_regenerations: default_max_regenerations(),
            grading_concurrency: default_grading_concurrency(),
            stream_buffer: default_stream_buffer(),
            corpus_description: default_corpus_description(),
        }
    }
}

impl GraphConfig {
    pub fn with_max_regenerations(mut self, max: u32) -> Self {
        self.max_regenerations = max;
        self
    }

    pub fn with_grading_concurrency(mut self, concurrency: usize) -> Self {
        self.grading_concurrency = concurrency.max(1);
        self
    }

    pub fn with_stream_buffer(mut self, buffer: usize) -> Self {
        self.stream_buffer = buffer.max(1);
        self
    }

    pub fn with_corpus_description(mut self, description: impl Into<String>) -> Self {
        self.corpus_description = description.into();
        self
    }
}
