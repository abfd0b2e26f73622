//! HTTP request and response types

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatRequest, DiscardPayload, DonePayload, ResourcesResponse, StreamErrorPayload};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
