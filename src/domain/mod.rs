//! Domain layer - Core entities, collaborator contracts and the answer graph

pub mod auth;
pub mod completion;
pub mod document;
pub mod error;
pub mod generation;
pub mod grading;
pub mod graph;
pub mod retrieval;
pub mod web_search;

pub use auth::{TokenVerifier, VerifiedUser};
pub use completion::{
    ChatMessage, ChatRole, Completion, CompletionProvider, CompletionRequest,
    CompletionRequestBuilder, FinishReason, ResponseFormat, TokenChunk, TokenStream, Usage,
};
pub use document::{Document, WEB_SEARCH_SOURCE};
pub use error::DomainError;
pub use generation::{AnswerGenerator, AnswerStream};
pub use grading::{AnswerGrader, GroundednessGrader, QuestionRouter, RelevanceGrader, RouteDecision};
pub use graph::{
    GenerationGrade, GraphConfig, GraphEvent, GraphNode, GraphOutcome, RequestState,
    RetryCounter,
};
pub use retrieval::PassageRetriever;
pub use web_search::{WebSearchHit, WebSearchTool};
