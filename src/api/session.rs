// src/api/session.rs

use crate::agent::{ConversationTurn, Role};
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::session::HistoryStore;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub user_id: String,
}

/// Issue a fresh session id for a new user.
pub async fn start_handler() -> Json<StartResponse> {
    Json(StartResponse {
        user_id: Uuid::new_v4().to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub input: String,
    pub user_id: String,
}

/// The textual form a turn takes in history: the chat message itself, or
/// the envelope JSON for structured results.
fn assistant_content(envelope: &ResponseEnvelope) -> String {
    match envelope.action_type {
        ActionType::Chat => envelope.message.clone().unwrap_or_default(),
        _ => serde_json::to_string(envelope).unwrap_or_default(),
    }
}

fn wire_response(envelope: &ResponseEnvelope) -> Value {
    match envelope.action_type {
        ActionType::Error => json!({
            "error": envelope
                .error
                .clone()
                .or_else(|| envelope.message.clone())
                .unwrap_or_else(|| "unknown error".to_string()),
            "action_type": ActionType::Error.as_str(),
        }),
        ActionType::Chat => json!({
            "output": envelope.message.clone().unwrap_or_default(),
            "action_type": ActionType::Chat.as_str(),
        }),
        other => json!({
            "output": serde_json::to_value(envelope).unwrap_or(Value::Null),
            "action_type": other.as_str(),
        }),
    }
}

/// One conversational turn. The whole read-run-append-write cycle holds
/// the session's lock, so concurrent requests for the same session
/// serialize instead of losing turns.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Value> {
    let lock = state.session_locks.lock_for(&request.user_id);
    let _guard = lock.lock().await;

    let mut turns = state.history.get_history(&request.user_id).await;
    info!(
        "session {}: {} prior turns",
        request.user_id,
        turns.len()
    );

    let envelope = state.orchestrator.run(&request.input, &turns).await;

    turns.push(ConversationTurn::new(Role::User, request.input.clone()));
    turns.push(ConversationTurn::new(
        Role::Assistant,
        assistant_content(&envelope),
    ));
    state.history.set_history(&request.user_id, turns).await;

    Json(wire_response(&envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn chat_envelopes_surface_the_message_string() {
        let env = ResponseEnvelope::chat("hello there");
        let v = wire_response(&env);
        assert_eq!(v["output"], "hello there");
        assert_eq!(v["action_type"], "chat");
    }

    #[test]
    fn structured_envelopes_surface_the_full_object() {
        let mut data = Map::new();
        data.insert("gas".into(), json!("21000"));
        let env = ResponseEnvelope::success(ActionType::GasEstimation, data);
        let v = wire_response(&env);
        assert_eq!(v["action_type"], "gas_estimation");
        assert_eq!(v["output"]["gas"], "21000");
        assert_eq!(v["output"]["status"], "success");
    }

    #[test]
    fn error_envelopes_use_the_error_key() {
        let env = ResponseEnvelope::error(ActionType::Error, "model unreachable");
        let v = wire_response(&env);
        assert_eq!(v["action_type"], "error");
        assert_eq!(v["error"], "model unreachable");
        assert!(v.get("output").is_none());
    }
}
