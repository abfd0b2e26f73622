//! Executable answer graph and its node implementations

mod document_grader;
mod orchestrator;
mod web_searcher;

pub use document_grader::DocumentGrader;
pub use orchestrator::{CorrectiveRagGraph, CorrectiveRagGraphBuilder, GraphEventStream};
pub use web_searcher::WebSearcher;
