//! CLI entry points
//!
//! - `serve`: HTTP server (default deployment mode)
//! - `ask`: answer one question on stdout, for smoke tests
//! - `graph`: print the answer graph as a Mermaid diagram

pub mod ask;
pub mod graph;
pub mod serve;

use clap::{Parser, Subcommand};

/// Corrective RAG chat service
#[derive(Parser)]
#[command(name = "crag-chat-service")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Stream the answer to a single question
    Ask(ask::AskArgs),

    /// Print the answer graph in Mermaid syntax
    Graph,
}
