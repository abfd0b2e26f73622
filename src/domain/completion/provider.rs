use std::fmt::Debug;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{Completion, CompletionRequest, TokenChunk};
use crate::domain::DomainError;

/// Stream of incremental completion tokens
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<TokenChunk, DomainError>> + Send>>;

/// Trait for the LLM completion service
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Request a single completion string
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError>;

    /// Request an incremental token stream
    async fn complete_stream(&self, request: CompletionRequest)
    -> Result<TokenStream, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
