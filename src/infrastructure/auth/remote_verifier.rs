use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{DomainError, TokenVerifier, VerifiedUser};
use crate::infrastructure::http_client::HttpClientTrait;

/// Delegates token checks to the identity service's `POST /auth/verify-token`
#[derive(Debug)]
pub struct RemoteTokenVerifier<C: HttpClientTrait> {
    client: C,
    base_url: String,
}

impl<C: HttpClientTrait> RemoteTokenVerifier<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn verify_url(&self) -> String {
        format!("{}/auth/verify-token", self.base_url)
    }
}

#[async_trait]
impl<C: HttpClientTrait> TokenVerifier for RemoteTokenVerifier<C> {
    async fn verify(&self, token: &str) -> Result<Option<VerifiedUser>, DomainError> {
        let body = serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
        });

        match self
            .client
            .post_json(&self.verify_url(), vec![("Content-Type", "application/json")], &body)
            .await
        {
            Ok(claims) => Ok(Some(VerifiedUser::new(claims))),
            // Any non-success answer from the identity service is a rejection.
            Err(DomainError::Dependency { message, .. }) if message.starts_with("HTTP ") => {
                debug!(reason = %message, "Token rejected by identity service");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                Ok(None)
            }
        }
    }
}
