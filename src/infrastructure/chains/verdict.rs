//! Parsing of structured classifier replies

use serde_json::Value;

use crate::domain::DomainError;

/// Extract JSON object from a string (handles markdown code blocks)
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Look up a top-level field of the JSON object embedded in the reply
pub fn json_field(text: &str, field: &str) -> Option<Value> {
    let json = extract_json(text)?;
    let value: Value = serde_json::from_str(json).ok()?;
    value.get(field).cloned()
}

/// Interpret a `binary_score` reply.
///
/// Accepts `{"binary_score": "yes"}`, a JSON boolean, or a bare leading yes/no.
pub fn parse_binary_score(chain: &'static str, reply: &str) -> Result<bool, DomainError> {
    let verdict = match json_field(reply, "binary_score") {
        Some(Value::Bool(flag)) => Some(flag),
        Some(Value::String(score)) => yes_no(&score),
        _ => yes_no(reply),
    };

    verdict.ok_or_else(|| {
        DomainError::dependency(chain, format!("Unrecognised binary score: {}", reply.trim()))
    })
}

fn yes_no(text: &str) -> Option<bool> {
    let word = text
        .trim()
        .split(|c: char| !c.is_alphanumeric())
        .find(|w| !w.is_empty())?
        .to_lowercase();

    match word.as_str() {
        "yes" | "true" => Some(true),
        "no" | "false" => Some(false),
        _ => None,
    }
}
