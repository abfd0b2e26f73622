use serde::Serialize;

use super::{GenerationGrade, GraphNode};
use crate::domain::Document;

/// Progress emitted while one request traverses the graph
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeStarted(GraphNode),
    /// Answer fragment from the current generation attempt
    Token(String),
    /// The generation streamed since the last rejection was graded and dropped
    GenerationRejected {
        attempt: u32,
        grade: GenerationGrade,
    },
    Completed(GraphOutcome),
}

/// Final result of a traversal that reached END
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphOutcome {
    pub generation: String,
    pub documents: Vec<Document>,
    pub regenerations: u32,
    pub path: Vec<GraphNode>,
}
