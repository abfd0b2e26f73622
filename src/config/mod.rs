//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, CompletionConfig, LogFormat, LoggingConfig, RetrievalConfig,
    ServerConfig, UiConfig, WebSearchConfig,
};
