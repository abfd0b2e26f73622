//! Passages used as grounding context

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WebSearchHit;

/// Metadata key set on the synthetic document produced by web search
pub const WEB_SEARCH_SOURCE: &str = "web_search";

/// A retrieved or synthesized passage with attached metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Join web search hits into one synthetic document.
    ///
    /// Always produces a document, even for zero hits; result URLs are kept
    /// under the `urls` metadata key.
    pub fn from_web_results(hits: &[WebSearchHit]) -> Self {
        let joined = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let urls: Vec<Value> = hits
            .iter()
            .filter_map(|hit| hit.url.clone())
            .map(Value::String)
            .collect();

        let document = Self::new(joined).with_metadata("source", WEB_SEARCH_SOURCE);
        if urls.is_empty() {
            document
        } else {
            document.with_metadata("urls", Value::Array(urls))
        }
    }

    /// Result URLs of a web search document
    pub fn urls(&self) -> Vec<&str> {
        self.metadata
            .get("urls")
            .and_then(Value::as_array)
            .map(|urls| urls.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Metadata value rendered as plain text
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    pub fn source(&self) -> Option<String> {
        self.metadata_text("source")
    }

    pub fn page(&self) -> Option<String> {
        self.metadata_text("page")
    }

    pub fn is_web_result(&self) -> bool {
        self.source().as_deref() == Some(WEB_SEARCH_SOURCE)
    }
}
