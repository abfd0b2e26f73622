//! Binary classifiers and the question router
//!
//! Each grader is a pure function from (context, candidate) to a verdict. Verdicts are
//! plain `bool`s returned to the caller and never stored.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Document, DomainError};

/// Where a question should be answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Answerable from the indexed corpus
    Corpus,
    /// Needs open web search
    Web,
}

/// Classifies a question as corpus-answerable or web-bound
#[async_trait]
pub trait QuestionRouter: Send + Sync + std::fmt::Debug {
    async fn route(&self, question: &str) -> Result<RouteDecision, DomainError>;
}

/// Relevance of one document to the question
#[async_trait]
pub trait RelevanceGrader: Send + Sync + std::fmt::Debug {
    async fn is_relevant(&self, question: &str, document: &Document) -> Result<bool, DomainError>;
}

/// Whether a generation is supported by the document set
#[async_trait]
pub trait GroundednessGrader: Send + Sync + std::fmt::Debug {
    async fn is_grounded(
        &self,
        documents: &[Document],
        generation: &str,
    ) -> Result<bool, DomainError>;
}

/// Whether a generation addresses the question
#[async_trait]
pub trait AnswerGrader: Send + Sync + std::fmt::Debug {
    async fn is_responsive(&self, question: &str, generation: &str) -> Result<bool, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    pub struct FixedRouter(pub RouteDecision);

    #[async_trait]
    impl QuestionRouter for FixedRouter {
        async fn route(&self, _question: &str) -> Result<RouteDecision, DomainError> {
            Ok(self.0)
        }
    }

    /// Marks a document relevant when its content contains the marker
    #[derive(Debug)]
    pub struct MarkerRelevanceGrader {
        marker: String,
        calls: AtomicUsize,
    }

    impl MarkerRelevanceGrader {
        pub fn new(marker: impl Into<String>) -> Self {
            Self {
                marker: marker.into(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RelevanceGrader for MarkerRelevanceGrader {
        async fn is_relevant(
            &self,
            _question: &str,
            document: &Document,
        ) -> Result<bool, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(document.content.contains(&self.marker))
        }
    }

    /// Returns scripted verdicts in order, repeating the last one once exhausted
    #[derive(Debug)]
    pub struct ScriptedVerdicts {
        verdicts: Mutex<VecDeque<bool>>,
        last: Mutex<bool>,
        calls: AtomicUsize,
        error: Option<String>,
    }

    impl ScriptedVerdicts {
        pub fn new(verdicts: &[bool]) -> Self {
            Self {
                verdicts: Mutex::new(verdicts.iter().copied().collect()),
                last: Mutex::new(verdicts.last().copied().unwrap_or(true)),
                calls: AtomicUsize::new(0),
                error: None,
            }
        }

        pub fn always(verdict: bool) -> Self {
            Self::new(&[verdict])
        }

        pub fn failing(error: impl Into<String>) -> Self {
            Self {
                error: Some(error.into()),
                ..Self::new(&[])
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Result<bool, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::dependency("mock_grader", error));
            }

            let mut last = self.last.lock().unwrap();
            if let Some(verdict) = self.verdicts.lock().unwrap().pop_front() {
                *last = verdict;
            }
            Ok(*last)
        }
    }

    #[async_trait]
    impl GroundednessGrader for ScriptedVerdicts {
        async fn is_grounded(
            &self,
            _documents: &[Document],
            _generation: &str,
        ) -> Result<bool, DomainError> {
            self.next()
        }
    }

    #[async_trait]
    impl AnswerGrader for ScriptedVerdicts {
        async fn is_responsive(
            &self,
            _question: &str,
            _generation: &str,
        ) -> Result<bool, DomainError> {
            self.next()
        }
    }

    #[async_trait]
    impl RelevanceGrader for ScriptedVerdicts {
        async fn is_relevant(
            &self,
            _question: &str,
            _document: &Document,
        ) -> Result<bool, DomainError> {
            self.next()
        }
    }
}
