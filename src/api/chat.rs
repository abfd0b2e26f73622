//! Streaming chat endpoint
//!
//! Answer tokens go out as unnamed SSE events. A generation that fails
//! self-grading is followed by a `discard` event, the successful end of the
//! graph by `done`, and a failure after streaming started by `error`.

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use super::middleware::RequireUser;
use super::state::AppState;
use super::types::{
    ApiError, ChatRequest, DiscardPayload, DonePayload, Json, StreamErrorPayload,
};
use crate::domain::{DomainError, GraphEvent};

pub async fn chat(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let question = request.validated_question()?.to_string();

    info!(
        email = user.email().unwrap_or("unknown"),
        question_len = question.len(),
        "Chat request accepted"
    );

    let mut events = state.graph.stream(question);

    // Hold the response until there is something to send, so failures before
    // the first token still get a proper status code.
    let first = loop {
        match events.next().await {
            Some(Ok(GraphEvent::NodeStarted(node))) => debug!(node = %node, "Node started"),
            Some(Ok(event)) => break Ok(event),
            Some(Err(e)) => return Err(e.into()),
            None => return Err(ApiError::internal("Graph ended without an answer")),
        }
    };

    let body = stream::iter([first])
        .chain(events)
        .filter_map(|event| async move { to_sse_event(event) })
        .map(Ok);

    Ok(Sse::new(body).keep_alive(KeepAlive::default()))
}

/// `None` for events the client does not need
fn to_sse_event(event: Result<GraphEvent, DomainError>) -> Option<Event> {
    match event {
        Ok(GraphEvent::NodeStarted(_)) => None,
        Ok(GraphEvent::Token(token)) => Some(Event::default().data(token)),
        Ok(GraphEvent::GenerationRejected { attempt, grade }) => {
            Some(json_event("discard", &DiscardPayload { attempt, grade }))
        }
        Ok(GraphEvent::Completed(outcome)) => {
            Some(json_event("done", &DonePayload::from(&outcome)))
        }
        Err(e) => Some(json_event(
            "error",
            &StreamErrorPayload {
                message: e.to_string(),
            },
        )),
    }
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    let data = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(name).data(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{chat_request, read_body, TestApp, TOKEN};
    use crate::domain::generation::mock::CitingGenerator;
    use crate::domain::grading::mock::ScriptedVerdicts;
    use crate::domain::retrieval::mock::MockPassageRetriever;
    use crate::domain::{Document, GenerationGrade, RouteDecision};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_node_events_are_not_sent() {
        let event = to_sse_event(Ok(GraphEvent::NodeStarted(crate::domain::GraphNode::Retrieve)));
        assert!(event.is_none());
    }

    #[test]
    fn test_discard_payload() {
        let event = to_sse_event(Ok(GraphEvent::GenerationRejected {
            attempt: 1,
            grade: GenerationGrade::NotSupported,
        }));
        assert!(event.is_some());
    }

    #[tokio::test]
    async fn test_streams_answer_then_done() {
        let app = TestApp::new(RouteDecision::Corpus)
            .with_documents(vec![Document::new("eTOM is a process framework [relevant]")]);

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"What is eTOM?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");

        let body = read_body(response).await;
        assert!(body.contains("data: <cited_answer><answer>\n"));
        assert!(body.contains("<quote>eTOM is a process framework [relevant]</quote>"));
        assert!(body.contains("event: done"));
        assert!(body.contains(r#"data: {"regenerations":0,"documents":1}"#));
        assert!(!body.contains("event: error"));
    }

    #[tokio::test]
    async fn test_rejected_generation_is_discarded() {
        let app = TestApp::new(RouteDecision::Corpus)
            .with_documents(vec![Document::new("TM Forum [relevant]")])
            .with_groundedness(ScriptedVerdicts::new(&[false, true]));

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"Who runs TM Forum?"}"#))
            .await
            .unwrap();
        let body = read_body(response).await;

        let discard = body.find("event: discard").unwrap();
        let done = body.find("event: done").unwrap();
        assert!(discard < done);
        assert!(body.contains(r#"{"attempt":1,"grade":"not supported"}"#));
        assert_eq!(body.matches("data: ok\n").count(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_is_401() {
        let app = TestApp::new(RouteDecision::Corpus);

        let response = app
            .router()
            .oneshot(chat_request(None, r#"{"question":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "Bearer");
        assert_eq!(app.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_token_is_401() {
        let app = TestApp::new(RouteDecision::Corpus);

        let response = app
            .router()
            .oneshot(chat_request(Some("forged"), r#"{"question":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_blank_question_is_400() {
        let app = TestApp::new(RouteDecision::Corpus);

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"  "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_retrieval_failure_before_streaming_is_503() {
        let app = TestApp::new(RouteDecision::Corpus)
            .with_retriever(MockPassageRetriever::new(vec![]).with_error("connection refused"));

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"What is eTOM?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = read_body(response).await;
        assert!(body.contains("dependency_error"));
    }

    #[tokio::test]
    async fn test_failure_after_first_token_is_error_event() {
        let app = TestApp::new(RouteDecision::Corpus)
            .with_generator(Arc::new(CitingGenerator::failing_mid_stream()));

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"What is eTOM?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert!(body.contains("data: <cited_answer>\n"));
        assert!(body.contains("event: error"));
        assert!(body.contains("connection reset"));
        assert!(!body.contains("event: done"));
    }

    #[tokio::test]
    async fn test_loop_exhaustion_is_error_event() {
        let app = TestApp::new(RouteDecision::Corpus)
            .with_documents(vec![Document::new("TM Forum [relevant]")])
            .with_groundedness(ScriptedVerdicts::always(false));

        let response = app
            .router()
            .oneshot(chat_request(Some(TOKEN), r#"{"question":"Who runs TM Forum?"}"#))
            .await
            .unwrap();
        let body = read_body(response).await;

        assert_eq!(body.matches("event: discard").count(), 4);
        assert!(body.contains("event: error"));
        assert!(body.contains("Regeneration limit exhausted after 4 attempts"));
    }
}
