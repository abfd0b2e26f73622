use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde::{Deserialize, Serialize};

use crate::domain::{
    ChatMessage, ChatRole, Completion, CompletionProvider, CompletionRequest, DomainError,
    FinishReason, ResponseFormat, TokenChunk, TokenStream, Usage,
};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const SERVICE: &str = "completion";

/// Completion service speaking the OpenAI chat-completions protocol
#[derive(Debug)]
pub struct OpenAiCompletionProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl<C: HttpClientTrait> OpenAiCompletionProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Default temperature applied when a request does not set one
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, request: &CompletionRequest, stream: bool) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": stream,
        });

        if let Some(temperature) = request.temperature.or(self.temperature) {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if request.response_format == ResponseFormat::JsonObject {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Completion, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::dependency(SERVICE, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::dependency(SERVICE, "No choices in response"))?;

        let mut completion =
            Completion::new(response.id, choice.message.content.unwrap_or_default());

        if let Some(reason) = choice.finish_reason {
            completion = completion.with_finish_reason(FinishReason::parse(&reason));
        }

        if let Some(usage) = response.usage {
            completion = completion.with_usage(Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            });
        }

        Ok(completion)
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for OpenAiCompletionProvider<C> {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, DomainError> {
        let body = self.build_request(&request, false);
        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body)
            .await?;

        self.parse_response(response)
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<TokenStream, DomainError> {
        let body = self.build_request(&request, true);
        let byte_stream = self
            .client
            .post_json_stream(&self.chat_completions_url(), self.headers(), &body)
            .await?;

        // Network chunks align with neither SSE events nor UTF-8 characters; a
        // trailing `None` marks the end of the body so truncation is caught.
        let stream = byte_stream
            .map(Some)
            .chain(stream::once(future::ready(None)))
            .scan(SseLineBuffer::default(), |buffer, item| {
                let chunks = match item {
                    Some(Ok(bytes)) => buffer.push(&bytes),
                    Some(Err(e)) => buffer.fail(e),
                    None => buffer.finish(),
                };
                future::ready(Some(stream::iter(chunks)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

/// Reassembles SSE lines from raw body bytes and tracks whether the
/// service signalled the end of the completion.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
    finished: bool,
    failed: bool,
}

impl SseLineBuffer {
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<TokenChunk, DomainError>> {
        self.pending.extend_from_slice(bytes);

        let Some(end) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        complete
            .split(|&b| b == b'\n')
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    fn fail(&mut self, error: DomainError) -> Vec<Result<TokenChunk, DomainError>> {
        self.failed = true;
        vec![Err(error)]
    }

    /// Flush an unterminated last line, then reject a body that ended early
    fn finish(&mut self) -> Vec<Result<TokenChunk, DomainError>> {
        if self.failed {
            return Vec::new();
        }

        let rest = std::mem::take(&mut self.pending);
        let mut chunks: Vec<_> = self.parse_line(&rest).into_iter().collect();

        if !self.finished && !chunks.iter().any(Result::is_err) {
            chunks.push(Err(DomainError::dependency(
                SERVICE,
                "stream ended before completion",
            )));
        }

        chunks
    }

    fn parse_line(&mut self, line: &[u8]) -> Option<Result<TokenChunk, DomainError>> {
        let line = match std::str::from_utf8(line) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(e) => {
                self.failed = true;
                return Some(Err(DomainError::dependency(
                    SERVICE,
                    format!("Invalid UTF-8 in stream: {}", e),
                )));
            }
        };

        let parsed = parse_sse_line(line)?;
        match &parsed {
            Ok(chunk) if chunk.finish_reason.is_some() => self.finished = true,
            Err(_) => self.failed = true,
            Ok(_) => {}
        }
        Some(parsed)
    }
}

fn parse_sse_line(line: &str) -> Option<Result<TokenChunk, DomainError>> {
    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Ok(TokenChunk::finished(FinishReason::Stop)));
    }

    let chunk = match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return Some(Err(DomainError::dependency(
                SERVICE,
                format!("Malformed stream chunk: {}", e),
            )));
        }
    };

    let choice = chunk.choices.into_iter().next()?;

    if let Some(reason) = choice.finish_reason {
        return Some(Ok(TokenChunk::finished(FinishReason::parse(&reason))));
    }

    choice
        .delta
        .content
        .filter(|content| !content.is_empty())
        .map(|content| Ok(TokenChunk::text(content)))
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };

        Self {
            role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    choices: Vec<OpenAiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiDelta {
    content: Option<String>,
}
