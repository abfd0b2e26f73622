//! Chat request and response bodies

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, GenerationGrade, GraphOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

impl ChatRequest {
    /// Trimmed question, rejecting blank input
    pub fn validated_question(&self) -> Result<&str, DomainError> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("question must not be empty"));
        }
        Ok(question)
    }
}

/// Payload of the `discard` event
#[derive(Debug, Clone, Serialize)]
pub struct DiscardPayload {
    pub attempt: u32,
    pub grade: GenerationGrade,
}

/// Payload of the `done` event
#[derive(Debug, Clone, Serialize)]
pub struct DonePayload {
    pub regenerations: u32,
    pub documents: usize,
}

impl From<&GraphOutcome> for DonePayload {
    fn from(outcome: &GraphOutcome) -> Self {
        Self {
            regenerations: outcome.regenerations,
            documents: outcome.documents.len(),
        }
    }
}

/// Payload of the `error` event
#[derive(Debug, Clone, Serialize)]
pub struct StreamErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesResponse {
    pub message: String,
    pub user_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_question_is_rejected() {
        let request = ChatRequest {
            question: "   ".to_string(),
        };
        assert!(matches!(
            request.validated_question(),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_question_is_trimmed() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"question": "  What is eTOM? \n"}"#).unwrap();
        assert_eq!(request.validated_question().unwrap(), "What is eTOM?");
    }

    #[test]
    fn test_discard_payload_uses_grade_label() {
        let payload = DiscardPayload {
            attempt: 2,
            grade: GenerationGrade::NotUseful,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["grade"], "not useful");
        assert_eq!(json["attempt"], 2);
    }
}
