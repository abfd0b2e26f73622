//! Corrective RAG state machine: nodes, edges, per-request state and events

mod config;
mod edges;
mod event;
mod node;
mod state;

pub use config::GraphConfig;
pub use edges::{Edge, GenerationGrade, EDGES, after_entry, after_grading, grade_generation, to_mermaid};
pub use event::{GraphEvent, GraphOutcome};
pub use node::GraphNode;
pub use state::{RequestState, RetryCounter};
