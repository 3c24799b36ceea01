// src/agent/normalizer.rs
//
// The last gate before anything leaves the system: whatever a tool or the
// model produced, the caller receives a well-formed envelope.

use crate::envelope::ResponseEnvelope;
use serde_json::{json, Value};

/// Pull the contents out of the first fenced code block, if any. Models
/// like to wrap JSON in ```json fences.
fn extract_fenced(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let after = &raw[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let end = after.find("```")?;
    Some(after[..end].trim())
}

/// Normalize arbitrary agent/tool output into an envelope.
///
/// Order of attempts: unwrap a fenced JSON block, parse, ensure the object
/// carries an action type (injecting "chat" when absent), and fall back to
/// wrapping the raw text as a chat message. Idempotent: a serialized
/// envelope normalizes to itself.
pub fn normalize(raw: &str) -> ResponseEnvelope {
    let candidate = extract_fenced(raw).unwrap_or_else(|| raw.trim());

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(mut map)) => {
            if !map.contains_key("action_type") {
                map.insert("action_type".to_string(), json!("chat"));
            }
            if !map.contains_key("status") {
                map.insert("status".to_string(), json!("success"));
            }
            match serde_json::from_value::<ResponseEnvelope>(Value::Object(map)) {
                Ok(envelope) => envelope,
                // Unrecognized discriminators still leave as plain chat.
                Err(_) => ResponseEnvelope::chat(raw),
            }
        }
        _ => ResponseEnvelope::chat(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{ActionType, Status};

    #[test]
    fn plain_text_becomes_chat() {
        let env = normalize("Your balance is 1.5 MATIC");
        assert_eq!(env.action_type, ActionType::Chat);
        assert_eq!(env.status, Status::Success);
        assert_eq!(env.message.as_deref(), Some("Your balance is 1.5 MATIC"));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let raw = "Here you go:\n```json\n{\"action_type\":\"balance_query\",\"status\":\"success\",\"balance\":\"1.5\"}\n```";
        let env = normalize(raw);
        assert_eq!(env.action_type, ActionType::BalanceQuery);
        assert_eq!(env.data["balance"], "1.5");
    }

    #[test]
    fn bare_object_without_action_type_gets_chat_injected() {
        let env = normalize("{\"message\":\"hello\"}");
        assert_eq!(env.action_type, ActionType::Chat);
        assert_eq!(env.status, Status::Success);
        assert_eq!(env.message.as_deref(), Some("hello"));
    }

    #[test]
    fn non_object_json_is_wrapped_as_chat() {
        for raw in ["42", "\"hi\"", "[1,2,3]", "true"] {
            let env = normalize(raw);
            assert_eq!(env.action_type, ActionType::Chat);
            assert_eq!(env.message.as_deref(), Some(raw));
        }
    }

    #[test]
    fn unknown_action_type_falls_back_to_chat_wrapper() {
        let raw = "{\"action_type\":\"teleport\",\"status\":\"success\"}";
        let env = normalize(raw);
        assert_eq!(env.action_type, ActionType::Chat);
        assert_eq!(env.message.as_deref(), Some(raw));
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "plain text",
            "{\"action_type\":\"gas_estimation\",\"status\":\"success\",\"gas\":\"21000\"}",
            "```json\n{\"foo\":1}\n```",
            "[not an object]",
        ];
        for raw in inputs {
            let once = normalize(raw);
            let again = normalize(&serde_json::to_string(&once).unwrap());
            assert_eq!(once, again, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn unterminated_fence_is_treated_as_text() {
        let raw = "```json\n{\"a\":1}";
        let env = normalize(raw);
        assert_eq!(env.action_type, ActionType::Chat);
        assert_eq!(env.message.as_deref(), Some(raw));
    }
}
