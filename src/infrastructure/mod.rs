//! Infrastructure layer - External service implementations

pub mod auth;
pub mod chains;
pub mod completion;
pub mod graph;
pub mod http_client;
pub mod logging;
pub mod observability;
pub mod retrieval;
pub mod web_search;
