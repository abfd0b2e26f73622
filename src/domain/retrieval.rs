//! Passage retrieval contract

use async_trait::async_trait;

use super::{Document, DomainError};

/// Fetches passages for a question from the indexed corpus
#[async_trait]
pub trait PassageRetriever: Send + Sync + std::fmt::Debug {
    /// Documents in service-assigned order with metadata attached unmodified
    async fn retrieve(&self, question: &str) -> Result<Vec<Document>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    pub struct MockPassageRetriever {
        documents: Vec<Document>,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockPassageRetriever {
        pub fn new(documents: Vec<Document>) -> Self {
            Self {
                documents,
                ..Default::default()
            }
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PassageRetriever for MockPassageRetriever {
        async fn retrieve(&self, _question: &str) -> Result<Vec<Document>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::dependency("mock_retrieval", error));
            }

            Ok(self.documents.clone())
        }
    }
}
