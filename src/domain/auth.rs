//! Bearer credential verification contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DomainError;

/// Identity returned by the external identity service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedUser {
    /// Raw verification payload as returned by the identity service
    pub claims: Value,
}

impl VerifiedUser {
    pub fn new(claims: Value) -> Self {
        Self { claims }
    }

    /// Email of the verified user (`user.email` in the verification payload)
    pub fn email(&self) -> Option<&str> {
        self.claims
            .get("user")
            .and_then(|user| user.get("email"))
            .and_then(Value::as_str)
    }
}

/// Verifies bearer tokens before a request reaches the graph
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug {
    /// `Ok(None)` when the identity service rejects the token
    async fn verify(&self, token: &str) -> Result<Option<VerifiedUser>, DomainError>;
}
