//! Bearer token authentication

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::VerifiedUser;

/// Extractor that requires a bearer token accepted by the identity service
#[derive(Debug, Clone)]
pub struct RequireUser(pub VerifiedUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let user = state
            .verifier
            .verify(token)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

        debug!(email = user.email().unwrap_or("unknown"), "Bearer token verified");

        Ok(RequireUser(user))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Bearer token required"))?
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized("Bearer token required"))?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::unauthorized("Bearer token required"));
    }

    Ok(token)
}
