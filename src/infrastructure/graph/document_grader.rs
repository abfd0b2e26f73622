use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use crate::domain::{Document, DomainError, RelevanceGrader};

/// Filters retrieved documents by relevance, grading them concurrently
#[derive(Debug, Clone)]
pub struct DocumentGrader {
    grader: Arc<dyn RelevanceGrader>,
    concurrency: usize,
}

impl DocumentGrader {
    pub fn new(grader: Arc<dyn RelevanceGrader>, concurrency: usize) -> Self {
        Self {
            grader,
            concurrency: concurrency.max(1),
        }
    }

    /// Returns the relevant documents in their original order and whether web search
    /// is needed, which holds exactly when none survived.
    pub async fn grade(
        &self,
        question: &str,
        documents: Vec<Document>,
    ) -> Result<(Vec<Document>, bool), DomainError> {
        let total = documents.len();

        let graded: Vec<(Document, bool)> = stream::iter(documents)
            .map(|document| {
                let grader = Arc::clone(&self.grader);
                async move {
                    let relevant = grader.is_relevant(question, &document).await?;
                    Ok::<_, DomainError>((document, relevant))
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let filtered: Vec<Document> = graded
            .into_iter()
            .filter_map(|(document, relevant)| relevant.then_some(document))
            .collect();

        let needs_web_search = filtered.is_empty();
        debug!(
            total,
            relevant = filtered.len(),
            needs_web_search,
            "Graded documents"
        );

        Ok((filtered, needs_web_search))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grading::mock::{MarkerRelevanceGrader, ScriptedVerdicts};

    fn docs(contents: &[&str]) -> Vec<Document> {
        contents.iter().map(|c| Document::new(*c)).collect()
    }

    #[tokio::test]
    async fn test_keeps_relevant_in_original_order() {
        let grader = Arc::new(MarkerRelevanceGrader::new("[rel]"));
        let document_grader = DocumentGrader::new(grader.clone(), 3);

        let input = docs(&["a [rel]", "b", "c [rel]", "d", "e [rel]"]);
        let (filtered, needs_web_search) = document_grader.grade("q", input).await.unwrap();

        let contents: Vec<&str> = filtered.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["a [rel]", "c [rel]", "e [rel]"]);
        assert!(!needs_web_search);
        assert_eq!(grader.calls(), 5);
    }

    /// Later documents finish grading first
    #[derive(Debug)]
    struct ReverseLatencyGrader {
        total: u64,
    }

    #[async_trait::async_trait]
    impl RelevanceGrader for ReverseLatencyGrader {
        async fn is_relevant(&self, _question: &str, document: &Document) -> Result<bool, DomainError> {
            let position: u64 = document.content.parse().unwrap();
            tokio::time::sleep(std::time::Duration::from_millis((self.total - position) * 15)).await;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_order_survives_out_of_order_completion() {
        let input: Vec<Document> = (0..6).map(|i| Document::new(i.to_string())).collect();
        let document_grader = DocumentGrader::new(Arc::new(ReverseLatencyGrader { total: 6 }), 4);

        let (filtered, _) = document_grader.grade("q", input).await.unwrap();

        let contents: Vec<&str> = filtered.iter().map(|d| d.content.as_str()).collect();
        assert_eq!(contents, vec!["0", "1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn test_nothing_relevant_needs_web_search() {
        let document_grader =
            DocumentGrader::new(Arc::new(MarkerRelevanceGrader::new("[rel]")), 2);

        let (filtered, needs_web_search) =
            document_grader.grade("q", docs(&["x", "y"])).await.unwrap();

        assert!(filtered.is_empty());
        assert!(needs_web_search);
    }

    #[tokio::test]
    async fn test_no_documents_needs_web_search() {
        let document_grader = DocumentGrader::new(Arc::new(ScriptedVerdicts::always(true)), 2);

        let (filtered, needs_web_search) = document_grader.grade("q", vec![]).await.unwrap();
        assert!(filtered.is_empty());
        assert!(needs_web_search);
    }

    #[tokio::test]
    async fn test_classifier_failure_is_fatal() {
        let document_grader =
            DocumentGrader::new(Arc::new(ScriptedVerdicts::failing("HTTP 503")), 4);

        let err = document_grader.grade("q", docs(&["a", "b"])).await.unwrap_err();
        assert!(err.is_dependency_failure());
    }
}
