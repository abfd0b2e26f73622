//! Router fixtures backed by the domain mocks

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    response::Response,
    Router,
};

use super::{create_router, AppState};
use crate::config::UiConfig;
use crate::domain::auth::mock::StaticTokenVerifier;
use crate::domain::generation::mock::CitingGenerator;
use crate::domain::grading::mock::{FixedRouter, MarkerRelevanceGrader, ScriptedVerdicts};
use crate::domain::retrieval::mock::MockPassageRetriever;
use crate::domain::web_search::mock::MockWebSearchTool;
use crate::domain::{AnswerGenerator, Document, PassageRetriever, RouteDecision, WebSearchTool};
use crate::infrastructure::graph::CorrectiveRagGraph;
use crate::infrastructure::retrieval::LazyPassageRetriever;

pub const TOKEN: &str = "valid-token";

pub struct TestApp {
    route: RouteDecision,
    retriever: Arc<dyn PassageRetriever>,
    web_search: Option<Arc<dyn WebSearchTool>>,
    pub generator: Arc<CitingGenerator>,
    custom_generator: Option<Arc<dyn AnswerGenerator>>,
    groundedness: Arc<ScriptedVerdicts>,
    ui: UiConfig,
    lazy_retrieval: Option<Arc<LazyPassageRetriever>>,
}

impl TestApp {
    pub fn new(route: RouteDecision) -> Self {
        Self {
            route,
            retriever: Arc::new(MockPassageRetriever::new(vec![])),
            web_search: None,
            generator: Arc::new(CitingGenerator::new()),
            custom_generator: None,
            groundedness: Arc::new(ScriptedVerdicts::always(true)),
            ui: UiConfig::default(),
            lazy_retrieval: None,
        }
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.retriever = Arc::new(MockPassageRetriever::new(documents));
        self
    }

    pub fn with_retriever(mut self, retriever: MockPassageRetriever) -> Self {
        self.retriever = Arc::new(retriever);
        self
    }

    pub fn with_web_hits(mut self, hits: &[&str]) -> Self {
        self.web_search = Some(Arc::new(MockWebSearchTool::new(hits)));
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.custom_generator = Some(generator);
        self
    }

    pub fn with_groundedness(mut self, verdicts: ScriptedVerdicts) -> Self {
        self.groundedness = Arc::new(verdicts);
        self
    }

    pub fn with_ui(mut self, ui: UiConfig) -> Self {
        self.ui = ui;
        self
    }

    pub fn with_lazy_retrieval(mut self, retrieval: Arc<LazyPassageRetriever>) -> Self {
        self.lazy_retrieval = Some(retrieval);
        self
    }

    pub fn router(&self) -> Router {
        let generator = self
            .custom_generator
            .clone()
            .unwrap_or_else(|| self.generator.clone() as Arc<dyn AnswerGenerator>);

        let graph = CorrectiveRagGraph::builder()
            .with_router(Arc::new(FixedRouter(self.route)))
            .with_retriever(self.retriever.clone())
            .with_relevance_grader(Arc::new(MarkerRelevanceGrader::new("[relevant]")))
            .with_web_search(self.web_search.clone())
            .with_generator(generator)
            .with_groundedness_grader(self.groundedness.clone())
            .with_answer_grader(Arc::new(ScriptedVerdicts::always(true)))
            .build()
            .unwrap();

        let verifier = Arc::new(StaticTokenVerifier::new(TOKEN, "analyst@example.com"));
        let mut state = AppState::new(graph, verifier, self.ui.clone());
        if let Some(retrieval) = &self.lazy_retrieval {
            state = state.with_retrieval(retrieval.clone());
        }

        create_router(state, true)
    }
}

pub fn chat_request(token: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn read_body(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
