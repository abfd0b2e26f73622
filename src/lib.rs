//! Corrective RAG chat service
//!
//! Answers questions over a document corpus. Each question is routed to the
//! corpus or the web, retrieved passages are graded for relevance, weak
//! retrievals fall back to web search, and every generated answer is graded
//! for groundedness and usefulness before the stream is allowed to finish.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{CompletionProvider, DomainError, PassageRetriever, TokenVerifier, WebSearchTool};
use infrastructure::{
    auth::RemoteTokenVerifier,
    chains::{
        LlmAnswerGenerator, LlmAnswerGrader, LlmGroundednessGrader, LlmQuestionRouter,
        LlmRelevanceGrader,
    },
    completion::OpenAiCompletionProvider,
    graph::CorrectiveRagGraph,
    http_client::HttpClient,
    retrieval::{HttpPassageRetriever, LazyPassageRetriever},
    web_search::TavilySearchTool,
};
use tracing::{info, warn};

/// Wire the answer graph and its collaborators from configuration.
///
/// The retrieval client is created on first use; the returned handle lets the
/// caller shut it down.
pub fn build_graph(
    config: &AppConfig,
) -> Result<(CorrectiveRagGraph, Arc<LazyPassageRetriever>), DomainError> {
    let completion: Arc<dyn CompletionProvider> = Arc::new(
        OpenAiCompletionProvider::new(
            HttpClient::new("completion", config.completion.timeout())?,
            config.completion.api_key.clone(),
            config.completion.model.clone(),
        )
        .with_base_url(config.completion.base_url.clone())
        .with_temperature(config.completion.temperature),
    );

    let retrieval_config = config.retrieval.clone();
    let retrieval = Arc::new(LazyPassageRetriever::new(move || {
        let client = HttpClient::new("retrieval", retrieval_config.timeout())?;
        let mut retriever = HttpPassageRetriever::new(client, retrieval_config.base_url.clone());
        if let Some(token) = &retrieval_config.api_token {
            retriever = retriever.with_api_token(token.clone());
        }
        Ok(Arc::new(retriever) as Arc<dyn PassageRetriever>)
    }));

    let graph = CorrectiveRagGraph::builder()
        .with_router(Arc::new(LlmQuestionRouter::new(
            completion.clone(),
            &config.graph.corpus_description,
        )))
        .with_retriever(retrieval.clone())
        .with_relevance_grader(Arc::new(LlmRelevanceGrader::new(completion.clone())))
        .with_web_search(build_web_search(config))
        .with_generator(Arc::new(LlmAnswerGenerator::new(completion.clone())))
        .with_groundedness_grader(Arc::new(LlmGroundednessGrader::new(completion.clone())))
        .with_answer_grader(Arc::new(LlmAnswerGrader::new(completion)))
        .with_config(config.graph.clone())
        .build()?;

    Ok((graph, retrieval))
}

/// `None` degrades WEBSEARCH to the identity; never fails startup
fn build_web_search(config: &AppConfig) -> Option<Arc<dyn WebSearchTool>> {
    web_search_tool(
        config,
        HttpClient::new("web_search", config.web_search.timeout()),
    )
}

fn web_search_tool(
    config: &AppConfig,
    client: Result<HttpClient, DomainError>,
) -> Option<Arc<dyn WebSearchTool>> {
    let Some(api_key) = config.web_search.active_api_key() else {
        warn!("Web search is not configured; web fallback will return documents unchanged");
        return None;
    };

    let client = match client {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "Web search client failed to initialize; web fallback disabled");
            return None;
        }
    };

    let tool = TavilySearchTool::new(client, api_key)
        .with_base_url(config.web_search.base_url.clone())
        .with_max_results(config.web_search.max_results);

    Some(Arc::new(tool))
}

/// Create the application state from configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    config.validate()?;

    let (graph, retrieval) = build_graph(config)?;

    let verifier: Arc<dyn TokenVerifier> = Arc::new(RemoteTokenVerifier::new(
        HttpClient::new("auth", config.auth.timeout())?,
        config.auth.base_url.clone(),
    ));

    info!(
        model = %config.completion.model,
        max_regenerations = config.graph.max_regenerations,
        web_search = !graph.web_search_degraded(),
        "Answer graph ready"
    );

    Ok(AppState::new(graph, verifier, config.ui.clone()).with_retrieval(retrieval))
}
