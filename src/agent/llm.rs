// src/agent/llm.rs
//
// OpenAI-compatible chat-completions client with function calling. The
// default endpoint is Gemini's OpenAI-compatible surface; anything that
// speaks the same wire format works.

use crate::error::AgentError;
use crate::tools::schema::ToolDefinition;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const MODEL_TIMEOUT_SECS: u64 = 60;

/// One message on the completions wire. Also used to feed tool results
/// back to the model between iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    pub fn text(role: &str, content: impl Into<String>) -> Self {
        WireMessage {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the wire format specifies.
    pub arguments: String,
}

/// A tool invocation the model asked for, with arguments already parsed.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What one model call produced: either final text, or tool calls to run.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// The language model seam. The orchestrator only sees this trait; tests
/// substitute a scripted implementation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(
        &self,
        messages: Vec<WireMessage>,
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Clone)]
pub struct ChatModelClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<SecretString>,
    max_tokens: u32,
}

impl ChatModelClient {
    pub fn new(
        http: Client,
        endpoint: String,
        model: String,
        api_key: Option<SecretString>,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            endpoint,
            model,
            api_key,
            max_tokens,
        }
    }

    fn tool_payload(tools: &[ToolDefinition]) -> Option<Vec<Value>> {
        if tools.is_empty() {
            return None;
        }
        Some(
            tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.input_schema,
                        }
                    })
                })
                .collect(),
        )
    }
}

#[async_trait]
impl ChatModel for ChatModelClient {
    async fn chat(
        &self,
        messages: Vec<WireMessage>,
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AgentError::CredentialMissing(
                "Model API key not set. Please set MODEL_API_KEY in your environment.".to_string(),
            )
        })?;

        let tool_payload = Self::tool_payload(tools);
        let request = CompletionRequest {
            model: &self.model,
            messages: &messages,
            max_tokens: self.max_tokens,
            tool_choice: tool_payload.as_ref().map(|_| "auto"),
            tools: tool_payload,
        };

        debug!(
            "model request: {} messages, {} tools",
            messages.len(),
            tools.len()
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .timeout(Duration::from_secs(MODEL_TIMEOUT_SECS))
            .bearer_auth(api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Orchestration(format!("model request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AgentError::Orchestration(format!("model response unreadable: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(AgentError::Orchestration(format!(
                "model returned {}: {}",
                status, detail
            )));
        }

        let parsed: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| AgentError::Orchestration(format!("unparseable model response: {}", e)))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Orchestration("model returned no choices".to_string()))?;

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.unwrap_or_default() {
            let arguments = serde_json::from_str(&call.function.arguments).map_err(|e| {
                AgentError::Orchestration(format!(
                    "unparseable arguments for tool '{}': {}",
                    call.function.name, e
                ))
            })?;
            tool_calls.push(ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments,
            });
        }

        Ok(ModelTurn {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
        })
    }
}

/// Build the messages that feed tool results back: the assistant's
/// tool-call message first, then one `tool` message per result.
pub fn tool_result_messages(
    calls: &[ToolCallRequest],
    results: &[(String, String)],
) -> Vec<WireMessage> {
    let wire_calls: Vec<WireToolCall> = calls
        .iter()
        .map(|c| WireToolCall {
            id: c.id.clone(),
            call_type: "function".to_string(),
            function: WireFunctionCall {
                name: c.name.clone(),
                arguments: c.arguments.to_string(),
            },
        })
        .collect();

    let mut messages = vec![WireMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: Some(wire_calls),
        tool_call_id: None,
    }];
    for (call_id, content) in results {
        messages.push(WireMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: Some(call_id.clone()),
        });
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_result_messages_pair_up() {
        let calls = vec![ToolCallRequest {
            id: "call_1".to_string(),
            name: "add".to_string(),
            arguments: json!({"a": 1, "b": 2}),
        }];
        let results = vec![("call_1".to_string(), "{\"result\":3}".to_string())];
        let messages = tool_result_messages(&calls, &results);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "assistant");
        assert_eq!(
            messages[0].tool_calls.as_ref().unwrap()[0].function.name,
            "add"
        );
        assert_eq!(messages[1].role, "tool");
        assert_eq!(messages[1].tool_call_id.as_deref(), Some("call_1"));
    }
}
