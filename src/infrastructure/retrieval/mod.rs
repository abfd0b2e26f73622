//! Passage retrieval clients

mod http_retriever;
mod shared;

pub use http_retriever::HttpPassageRetriever;
pub use shared::LazyPassageRetriever;
