//! Shared JSON-over-HTTP client used by every external collaborator

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError>;
}

/// reqwest-backed client bound to one named service and its per-call timeout.
///
/// Clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    service: &'static str,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(service: &'static str, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build {} HTTP client: {}", service, e))
            })?;

        Ok(Self {
            client,
            service,
            timeout,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    fn map_error(&self, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            DomainError::timeout(self.service, self.timeout.as_millis() as u64)
        } else {
            DomainError::dependency(self.service, format!("Request failed: {}", error))
        }
    }

    async fn send(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::dependency(
                self.service,
                format!("HTTP {}: {}", status.as_u16(), error_body),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(url, headers, body).await?;

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::timeout(self.service, self.timeout.as_millis() as u64)
            } else {
                DomainError::dependency(self.service, format!("Failed to parse response: {}", e))
            }
        })
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(url, headers, body).await?;

        let service = self.service;
        let timeout_ms = self.timeout.as_millis() as u64;
        let stream = response.bytes_stream().map(move |result| {
            result.map_err(|e| {
                if e.is_timeout() {
                    DomainError::timeout(service, timeout_ms)
                } else {
                    DomainError::dependency(service, format!("Stream error: {}", e))
                }
            })
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use futures::stream;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A recorded outgoing call
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub url: String,
        pub headers: Vec<(String, String)>,
        pub body: serde_json::Value,
    }

    #[derive(Debug)]
    enum Reply {
        Json(serde_json::Value),
        Stream(Vec<Bytes>),
        Error(DomainError),
    }

    /// Answers calls from a FIFO of scripted replies, regardless of URL
    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        replies: Mutex<VecDeque<Reply>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_json(self, reply: serde_json::Value) -> Self {
            self.replies.lock().unwrap().push_back(Reply::Json(reply));
            self
        }

        pub fn with_stream(self, chunks: &[&str]) -> Self {
            let chunks = chunks
                .iter()
                .map(|c| Bytes::from(c.to_string()))
                .collect();
            self.replies.lock().unwrap().push_back(Reply::Stream(chunks));
            self
        }

        /// Raw body chunks, for splits that are not valid UTF-8 on their own
        pub fn with_stream_bytes(self, chunks: &[&[u8]]) -> Self {
            let chunks = chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect();
            self.replies.lock().unwrap().push_back(Reply::Stream(chunks));
            self
        }

        pub fn with_error(self, error: DomainError) -> Self {
            self.replies.lock().unwrap().push_back(Reply::Error(error));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, url: &str, headers: Vec<(&str, &str)>, body: &serde_json::Value) -> Reply {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                headers: headers
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: body.clone(),
            });

            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Reply::Error(DomainError::dependency("mock", "No reply scripted")))
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, DomainError> {
            match self.record(url, headers, body) {
                Reply::Json(value) => Ok(value),
                Reply::Stream(_) => Err(DomainError::internal("Scripted a stream, got post_json")),
                Reply::Error(error) => Err(error),
            }
        }

        async fn post_json_stream(
            &self,
            url: &str,
            headers: Vec<(&str, &str)>,
            body: &serde_json::Value,
        ) -> Result<ByteStream, DomainError> {
            match self.record(url, headers, body) {
                Reply::Stream(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
                Reply::Json(_) => Err(DomainError::internal("Scripted JSON, got a stream call")),
                Reply::Error(error) => Err(error),
            }
        }
    }
}
