//! Grounded answer generation contract

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{Document, DomainError};

/// Stream of answer text fragments; their concatenation is the generation
pub type AnswerStream = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send>>;

/// Produces a cited answer from the question and the current document set
#[async_trait]
pub trait AnswerGenerator: Send + Sync + std::fmt::Debug {
    async fn generate(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<AnswerStream, DomainError>;
}
