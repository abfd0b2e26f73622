//! Ask command - answers one question without the HTTP layer

use std::io::Write;

use clap::Args;
use futures::StreamExt;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::GraphEvent;
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,
}

/// Tokens go to stdout as they arrive; logs go to stderr.
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_logging(&config.logging);
    config.validate()?;

    let (graph, retrieval) = crate::build_graph(&config)?;
    let mut events = graph.stream(args.question);
    let mut stdout = std::io::stdout();

    while let Some(event) = events.next().await {
        match event? {
            GraphEvent::NodeStarted(node) => debug!(node = %node, "Node started"),
            GraphEvent::Token(token) => {
                write!(stdout, "{}", token)?;
                stdout.flush()?;
            }
            GraphEvent::GenerationRejected { attempt, grade } => {
                writeln!(stdout, "\n[discarded attempt {}: {}]", attempt, grade.as_str())?;
            }
            GraphEvent::Completed(outcome) => {
                writeln!(stdout)?;
                debug!(
                    regenerations = outcome.regenerations,
                    documents = outcome.documents.len(),
                    "Answer complete"
                );
            }
        }
    }

    retrieval.shutdown().await;
    Ok(())
}
