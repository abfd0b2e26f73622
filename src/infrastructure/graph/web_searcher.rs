use std::sync::Arc;

use tracing::debug;

use crate::domain::{Document, DomainError, WebSearchTool};

/// Appends web results to the document set; identity when no tool is configured
#[derive(Debug, Clone, Default)]
pub struct WebSearcher {
    tool: Option<Arc<dyn WebSearchTool>>,
}

impl WebSearcher {
    pub fn new(tool: Option<Arc<dyn WebSearchTool>>) -> Self {
        Self { tool }
    }

    pub fn disabled() -> Self {
        Self { tool: None }
    }

    pub fn is_degraded(&self) -> bool {
        self.tool.is_none()
    }

    pub async fn search(
        &self,
        question: &str,
        mut documents: Vec<Document>,
    ) -> Result<Vec<Document>, DomainError> {
        let Some(tool) = &self.tool else {
            debug!("Skipping web search; tool is not configured");
            return Ok(documents);
        };

        let hits = tool.search(question).await?;

        let web_document = Document::from_web_results(&hits);
        debug!(
            tool = tool.tool_name(),
            results = hits.len(),
            urls = ?web_document.urls(),
            "Web search results"
        );
        documents.push(web_document);

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::web_search::mock::MockWebSearchTool;

    #[tokio::test]
    async fn test_appends_one_joined_document() {
        let tool = Arc::new(MockWebSearchTool::new(&["first hit", "second hit"]));
        let searcher = WebSearcher::new(Some(tool.clone()));

        let existing = vec![Document::new("corpus passage")];
        let documents = searcher.search("q", existing).await.unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].content, "corpus passage");
        assert_eq!(documents[1].content, "first hit\nsecond hit");
        assert!(documents[1].is_web_result());
        assert_eq!(tool.calls(), 1);
    }

    #[tokio::test]
    async fn test_unconfigured_tool_is_identity_twice() {
        let searcher = WebSearcher::disabled();
        assert!(searcher.is_degraded());

        let input = vec![Document::new("a"), Document::new("b")];
        let once = searcher.search("q", input.clone()).await.unwrap();
        let twice = searcher.search("q", once.clone()).await.unwrap();

        assert_eq!(once, input);
        assert_eq!(twice, input);
    }

    #[tokio::test]
    async fn test_empty_results_still_append_a_document() {
        let searcher = WebSearcher::new(Some(Arc::new(MockWebSearchTool::new(&[]))));

        let documents = searcher.search("q", vec![Document::new("a")]).await.unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[1].content, "");
        assert!(documents[1].is_web_result());
    }

    #[tokio::test]
    async fn test_tool_failure_is_fatal() {
        let tool = MockWebSearchTool::new(&[]).with_error("quota exceeded");
        let searcher = WebSearcher::new(Some(Arc::new(tool)));

        assert!(searcher.search("q", vec![]).await.is_err());
    }
}
