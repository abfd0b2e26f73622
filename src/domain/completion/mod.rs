//! Completion service domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{ChatMessage, ChatRole};
pub use provider::{CompletionProvider, TokenStream};
pub use request::{CompletionRequest, CompletionRequestBuilder, ResponseFormat};
pub use response::{Completion, FinishReason, TokenChunk, Usage};

#[cfg(test)]
pub use provider::mock::MockCompletionProvider;
