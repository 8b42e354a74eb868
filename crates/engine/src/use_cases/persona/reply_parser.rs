//! Persona reply parser.
//!
//! Personas answer with a JSON object `{"message": "...", "action": "..."}`.
//! Models like to wrap that object in markdown fences or chat around it, so
//! the parser strips ```json fences and decodes the outermost `{...}` span.

use regex_lite::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use sirius_domain::Action;

use crate::infrastructure::ports::LlmError;

/// Decoded `{message, action}` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaReply {
    pub message: String,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
struct RawPersonaReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

// Opening ```json (or bare ```) fence and closing ``` fence
static CODE_FENCE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").ok());

/// Remove markdown code fences around a payload.
fn strip_code_fences(raw: &str) -> String {
    match CODE_FENCE_RE.as_ref() {
        Some(re) => re.replace_all(raw, "").trim().to_string(),
        None => raw.replace("```json", "").replace("```", "").trim().to_string(),
    }
}

/// Outermost `{...}` span, if any.
fn outermost_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse an LLM completion into a persona reply.
///
/// A missing or unknown action is `Action::None`. Non-JSON content and an
/// empty `message` are `LlmError::InvalidResponse`.
pub fn parse_persona_reply(content: &str) -> Result<PersonaReply, LlmError> {
    let cleaned = strip_code_fences(content);
    let object = outermost_object(&cleaned)
        .ok_or_else(|| LlmError::invalid_response("reply contains no JSON object"))?;

    let raw: RawPersonaReply = serde_json::from_str(object)
        .map_err(|e| LlmError::invalid_response(format!("malformed reply JSON: {e}")))?;

    let message = raw.message.map(|m| m.trim().to_string()).unwrap_or_default();
    if message.is_empty() {
        return Err(LlmError::invalid_response("reply has an empty message"));
    }

    let action = raw
        .action
        .as_deref()
        .map(Action::parse_lenient)
        .unwrap_or_default();

    Ok(PersonaReply { message, action })
}
