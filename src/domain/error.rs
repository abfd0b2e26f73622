use thiserror::Error;

/// Core domain errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Dependency error: {service} - {message}")]
    Dependency { service: String, message: String },

    #[error("Timeout calling {service} after {timeout_ms}ms")]
    Timeout { service: String, timeout_ms: u64 },

    #[error("Regeneration limit exhausted after {attempts} attempts")]
    LoopExhaustion { attempts: u32 },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn dependency(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dependency {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn timeout(service: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            service: service.into(),
            timeout_ms,
        }
    }

    pub fn loop_exhaustion(attempts: u32) -> Self {
        Self::LoopExhaustion { attempts }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error came from an external collaborator (retrieval, completion, search)
    pub fn is_dependency_failure(&self) -> bool {
        matches!(self, Self::Dependency { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_error() {
        let error = DomainError::dependency("retrieval", "HTTP 500");
        assert_eq!(error.to_string(), "Dependency error: retrieval - HTTP 500");
        assert!(error.is_dependency_failure());
    }

    #[test]
    fn test_timeout_error() {
        let error = DomainError::timeout("web_search", 30000);
        assert_eq!(error.to_string(), "Timeout calling web_search after 30000ms");
        assert!(error.is_dependency_failure());
    }

    #[test]
    fn test_loop_exhaustion_error() {
        let error = DomainError::loop_exhaustion(4);
        assert_eq!(
            error.to_string(),
            "Regeneration limit exhausted after 4 attempts"
        );
        assert!(!error.is_dependency_failure());
    }

    #[test]
    fn test_configuration_error() {
        let error = DomainError::configuration("completion.api_key is required");
        assert_eq!(
            error.to_string(),
            "Configuration error: completion.api_key is required"
        );
    }
}
