//! Web search tool clients

mod tavily;

pub use tavily::TavilySearchTool;
