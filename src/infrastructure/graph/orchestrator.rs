//! Corrective RAG graph executor
//!
//! Runs one question through ENTRY, RETRIEVE, GRADE_DOCUMENTS, WEBSEARCH and GENERATE
//! until END or a fatal error. Progress is published on a bounded channel so callers can
//! stream answer tokens while the graph is still grading.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::document_grader::DocumentGrader;
use super::web_searcher::WebSearcher;
use crate::domain::graph::{after_entry, after_grading, grade_generation};
use crate::domain::{
    AnswerGenerator, AnswerGrader, DomainError, GenerationGrade, GraphConfig, GraphEvent,
    GraphNode, GraphOutcome, GroundednessGrader, PassageRetriever, QuestionRouter,
    RelevanceGrader, RequestState, WebSearchTool,
};
use crate::infrastructure::observability::{
    record_dependency_call, record_generation_rejected, record_graph_outcome, record_node_visit,
};

/// Stream of graph progress for one request; ends after `Completed` or an error
pub type GraphEventStream = ReceiverStream<Result<GraphEvent, DomainError>>;

/// The compiled answer graph. Cheap to clone; every request gets its own state.
#[derive(Debug, Clone)]
pub struct CorrectiveRagGraph {
    router: Arc<dyn QuestionRouter>,
    retriever: Arc<dyn PassageRetriever>,
    document_grader: DocumentGrader,
    web_searcher: WebSearcher,
    generator: Arc<dyn AnswerGenerator>,
    groundedness: Arc<dyn GroundednessGrader>,
    answer_grader: Arc<dyn AnswerGrader>,
    config: GraphConfig,
}

/// Builder for [`CorrectiveRagGraph`]
#[derive(Debug, Default)]
pub struct CorrectiveRagGraphBuilder {
    router: Option<Arc<dyn QuestionRouter>>,
    retriever: Option<Arc<dyn PassageRetriever>>,
    relevance: Option<Arc<dyn RelevanceGrader>>,
    web_search: Option<Arc<dyn WebSearchTool>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
    groundedness: Option<Arc<dyn GroundednessGrader>>,
    answer_grader: Option<Arc<dyn AnswerGrader>>,
    config: GraphConfig,
}

impl CorrectiveRagGraphBuilder {
    pub fn with_router(mut self, router: Arc<dyn QuestionRouter>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn PassageRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_relevance_grader(mut self, grader: Arc<dyn RelevanceGrader>) -> Self {
        self.relevance = Some(grader);
        self
    }

    /// Optional; without it WEBSEARCH passes documents through unchanged
    pub fn with_web_search(mut self, tool: Option<Arc<dyn WebSearchTool>>) -> Self {
        self.web_search = tool;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_groundedness_grader(mut self, grader: Arc<dyn GroundednessGrader>) -> Self {
        self.groundedness = Some(grader);
        self
    }

    pub fn with_answer_grader(mut self, grader: Arc<dyn AnswerGrader>) -> Self {
        self.answer_grader = Some(grader);
        self
    }

    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<CorrectiveRagGraph, DomainError> {
        fn required<T>(component: Option<T>, name: &str) -> Result<T, DomainError> {
            component.ok_or_else(|| {
                DomainError::configuration(format!("Graph is missing its {}", name))
            })
        }

        let relevance = required(self.relevance, "relevance grader")?;

        Ok(CorrectiveRagGraph {
            router: required(self.router, "question router")?,
            retriever: required(self.retriever, "retriever")?,
            document_grader: DocumentGrader::new(relevance, self.config.grading_concurrency),
            web_searcher: WebSearcher::new(self.web_search),
            generator: required(self.generator, "generator")?,
            groundedness: required(self.groundedness, "groundedness grader")?,
            answer_grader: required(self.answer_grader, "answer grader")?,
            config: self.config,
        })
    }
}

/// Sending half of a request's event channel
struct EventSink {
    tx: mpsc::Sender<Result<GraphEvent, DomainError>>,
}

impl EventSink {
    /// Waits for channel capacity; fails once the receiver is gone
    async fn emit(&self, event: GraphEvent) -> Result<(), DomainError> {
        self.tx
            .send(Ok(event))
            .await
            .map_err(|_| DomainError::internal("Event receiver dropped"))
    }
}

/// Await a collaborator call, recording its latency and result
async fn observed<T, F>(service: &'static str, call: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    let started = Instant::now();
    let result = call.await;
    record_dependency_call(service, started.elapsed(), result.is_ok());
    result
}

impl CorrectiveRagGraph {
    pub fn builder() -> CorrectiveRagGraphBuilder {
        CorrectiveRagGraphBuilder::default()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Whether WEBSEARCH runs without a tool
    pub fn web_search_degraded(&self) -> bool {
        self.web_searcher.is_degraded()
    }

    /// Run the question on a background task and stream its progress.
    ///
    /// Dropping the returned stream cancels the run, including any in-flight
    /// completion call.
    pub fn stream(&self, question: impl Into<String>) -> GraphEventStream {
        let (tx, rx) = mpsc::channel(self.config.stream_buffer.max(1));
        let graph = self.clone();
        let question = question.into();
        let span = info_span!("crag_request", request_id = %Uuid::new_v4());

        tokio::spawn(
            async move {
                let sink = EventSink { tx };

                tokio::select! {
                    result = graph.run(&question, &sink) => {
                        graph.finish(result, &sink).await;
                    }
                    _ = sink.tx.closed() => {
                        info!("Client disconnected, abandoning request");
                        record_graph_outcome("cancelled", 0);
                    }
                }
            }
            .instrument(span),
        );

        ReceiverStream::new(rx)
    }

    /// Run the question to completion, discarding intermediate events
    pub async fn invoke(&self, question: impl Into<String>) -> Result<GraphOutcome, DomainError> {
        let mut events = self.stream(question);

        while let Some(event) = events.next().await {
            if let GraphEvent::Completed(outcome) = event? {
                return Ok(outcome);
            }
        }

        Err(DomainError::internal("Graph stopped without reaching END"))
    }

    async fn finish(&self, result: Result<GraphOutcome, DomainError>, sink: &EventSink) {
        match result {
            Ok(outcome) => {
                info!(
                    regenerations = outcome.regenerations,
                    documents = outcome.documents.len(),
                    "Request reached END"
                );
                record_graph_outcome("useful", outcome.regenerations);
                let _ = sink.emit(GraphEvent::Completed(outcome)).await;
            }
            Err(_) if sink.tx.is_closed() => {
                info!("Client disconnected, abandoning request");
                record_graph_outcome("cancelled", 0);
            }
            Err(error) => {
                let outcome = match error {
                    DomainError::LoopExhaustion { .. } => "exhausted",
                    _ => "error",
                };
                warn!(error = %error, "Request failed");
                record_graph_outcome(outcome, 0);
                let _ = sink.tx.send(Err(error)).await;
            }
        }
    }

    async fn enter(
        &self,
        node: GraphNode,
        state: &mut RequestState,
        sink: &EventSink,
    ) -> Result<(), DomainError> {
        debug!(node = %node, "Entering node");
        state.visit(node);
        record_node_visit(node);
        sink.emit(GraphEvent::NodeStarted(node)).await
    }

    async fn run(&self, question: &str, sink: &EventSink) -> Result<GraphOutcome, DomainError> {
        let mut state = RequestState::new(question, self.config.max_regenerations);
        record_node_visit(GraphNode::Entry);
        sink.emit(GraphEvent::NodeStarted(GraphNode::Entry)).await?;

        let mut node = GraphNode::Entry;

        loop {
            let next = match node {
                GraphNode::Entry => {
                    let route = observed("completion", self.router.route(&state.question)).await?;
                    info!(?route, "Routed question");
                    after_entry(route)
                }
                GraphNode::Retrieve => {
                    state.documents =
                        observed("retrieval", self.retriever.retrieve(&state.question)).await?;
                    info!(documents = state.documents.len(), "Retrieved documents");
                    GraphNode::GradeDocuments
                }
                GraphNode::GradeDocuments => {
                    let documents = std::mem::take(&mut state.documents);
                    let (filtered, needs_web_search) = observed(
                        "completion",
                        self.document_grader.grade(&state.question, documents),
                    )
                    .await?;
                    state.documents = filtered;
                    state.needs_web_search = needs_web_search;
                    after_grading(needs_web_search)
                }
                GraphNode::WebSearch => {
                    let documents = std::mem::take(&mut state.documents);
                    state.documents = if self.web_searcher.is_degraded() {
                        self.web_searcher.search(&state.question, documents).await?
                    } else {
                        observed(
                            "web_search",
                            self.web_searcher.search(&state.question, documents),
                        )
                        .await?
                    };
                    GraphNode::Generate
                }
                GraphNode::Generate => {
                    let grade = self.generate_and_grade(&mut state, sink).await?;
                    grade.next()
                }
                GraphNode::End => {
                    return Ok(GraphOutcome {
                        generation: state.generation,
                        documents: state.documents,
                        regenerations: state.retries.regenerations(),
                        path: state.path,
                    });
                }
            };

            self.enter(next, &mut state, sink).await?;
            node = next;
        }
    }

    async fn generate_and_grade(
        &self,
        state: &mut RequestState,
        sink: &EventSink,
    ) -> Result<GenerationGrade, DomainError> {
        let attempt = state.retries.enter_generate()?;
        debug!(attempt, documents = state.documents.len(), "Generating answer");

        let started = Instant::now();
        let mut tokens = self
            .generator
            .generate(&state.question, &state.documents)
            .await
            .inspect_err(|_| record_dependency_call("completion", started.elapsed(), false))?;

        let mut generation = String::new();
        while let Some(token) = tokens.next().await {
            let token = token
                .inspect_err(|_| record_dependency_call("completion", started.elapsed(), false))?;
            generation.push_str(&token);
            sink.emit(GraphEvent::Token(token)).await?;
        }
        record_dependency_call("completion", started.elapsed(), true);
        state.generation = generation;

        let grounded = observed(
            "completion",
            self.groundedness
                .is_grounded(&state.documents, &state.generation),
        )
        .await?;

        let responsive = if grounded {
            Some(
                observed(
                    "completion",
                    self.answer_grader
                        .is_responsive(&state.question, &state.generation),
                )
                .await?,
            )
        } else {
            None
        };

        let grade = grade_generation(grounded, responsive);
        info!(attempt, grade = grade.as_str(), "Graded generation");

        if grade != GenerationGrade::Useful {
            record_generation_rejected(grade.as_str());
            sink.emit(GraphEvent::GenerationRejected { attempt, grade })
                .await?;
        }

        Ok(grade)
    }
}
