use crate::domain::{Document, DomainError};

use super::GraphNode;

/// Bounds how many times GENERATE may be re-entered for one request
#[derive(Debug, Clone)]
pub struct RetryCounter {
    max_regenerations: u32,
    generations: u32,
}

impl RetryCounter {
    pub fn new(max_regenerations: u32) -> Self {
        Self {
            max_regenerations,
            generations: 0,
        }
    }

    /// Records an entry into GENERATE and returns the 1-based attempt number.
    ///
    /// The first entry is free; each later one is a regeneration and fails with
    /// `LoopExhaustion` once the bound is exceeded.
    pub fn enter_generate(&mut self) -> Result<u32, DomainError> {
        if self.generations > 0 && self.regenerations() >= self.max_regenerations {
            return Err(DomainError::loop_exhaustion(self.generations));
        }
        self.generations += 1;
        Ok(self.generations)
    }

    pub fn generations(&self) -> u32 {
        self.generations
    }

    pub fn regenerations(&self) -> u32 {
        self.generations.saturating_sub(1)
    }
}

/// Per-request state; created at entry and dropped at termination
#[derive(Debug, Clone)]
pub struct RequestState {
    pub question: String,
    pub documents: Vec<Document>,
    pub generation: String,
    pub needs_web_search: bool,
    pub retries: RetryCounter,
    pub path: Vec<GraphNode>,
}

impl RequestState {
    pub fn new(question: impl Into<String>, max_regenerations: u32) -> Self {
        Self {
            question: question.into(),
            documents: Vec::new(),
            generation: String::new(),
            needs_web_search: false,
            retries: RetryCounter::new(max_regenerations),
            path: vec![GraphNode::Entry],
        }
    }

    pub fn visit(&mut self, node: GraphNode) {
        self.path.push(node);
    }

    pub fn visited(&self, node: GraphNode) -> bool {
        self.path.contains(&node)
    }
}
