// src/agent/orchestrator.rs

use crate::agent::llm::{tool_result_messages, ChatModel, WireMessage};
use crate::agent::normalizer::normalize;
use crate::agent::{ConversationTurn, Role};
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::tools::{Tool, ToolContext, ToolRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Hard ceiling on model round trips per request. The model normally
/// finishes in one or two; the bound exists so a confused model cannot
/// loop forever.
pub const MAX_TOOL_ITERATIONS: usize = 5;

const SYSTEM_PROMPT: &str = "You are a helpful blockchain and web search agent. You can check \
wallet balances and transaction history, prepare unsigned transactions and token approvals for \
external signing, estimate gas, check transaction status, and search the web. You support \
Polygon, Ethereum, BSC, Arbitrum, and U2U (mainnet and testnet). When users mention 'U2U \
mainnet' or 'U2U', use chain='u2u_mainnet'; for 'U2U testnet' use chain='u2u_testnet'. You can \
never sign or send transactions; you only prepare them. When a tool returns structured JSON, \
reproduce that JSON verbatim in a fenced ```json block in your reply, followed by a short \
plain-language summary. Be friendly and concise. If you don't know something, say so.";

/// Drives one request: decide, invoke tools, integrate results, answer.
pub struct Orchestrator {
    model: Arc<dyn ChatModel>,
    registry: Arc<ToolRegistry>,
    ctx: ToolContext,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ChatModel>, registry: Arc<ToolRegistry>, ctx: ToolContext) -> Self {
        Self {
            model,
            registry,
            ctx,
        }
    }

    /// Produce the final envelope for one user message. Never fails: every
    /// failure mode collapses into an error envelope.
    pub async fn run(&self, input: &str, history: &[ConversationTurn]) -> ResponseEnvelope {
        let definitions = self.registry.definitions();

        let mut messages = vec![WireMessage::text("system", SYSTEM_PROMPT)];
        for turn in history {
            messages.push(WireMessage::text(turn.role.as_str(), turn.content.clone()));
        }
        messages.push(WireMessage::text(Role::User.as_str(), input));

        for iteration in 1..=MAX_TOOL_ITERATIONS {
            let turn = match self.model.chat(messages.clone(), &definitions).await {
                Ok(turn) => turn,
                Err(e) => {
                    warn!("model call failed on iteration {}: {}", iteration, e);
                    return ResponseEnvelope::error(ActionType::Error, e.to_string());
                }
            };

            if turn.tool_calls.is_empty() {
                return normalize(&turn.content);
            }

            // Tools run sequentially within the turn; each result goes
            // back to the model before it answers.
            let mut results = Vec::with_capacity(turn.tool_calls.len());
            for call in &turn.tool_calls {
                info!("iteration {}: executing tool {}", iteration, call.name);
                let envelope = match self.registry.get(&call.name) {
                    Some(tool) => tool.execute(call.arguments.clone(), &self.ctx).await,
                    None => ResponseEnvelope::error(
                        ActionType::Error,
                        format!("Unknown tool: {}", call.name),
                    ),
                };
                let content = serde_json::to_string(&envelope)
                    .unwrap_or_else(|_| "{\"action_type\":\"error\",\"status\":\"error\"}".into());
                results.push((call.id.clone(), content));
            }
            messages.extend(tool_result_messages(&turn.tool_calls, &results));
        }

        warn!(
            "request exceeded {} tool iterations without a final answer",
            MAX_TOOL_ITERATIONS
        );
        ResponseEnvelope::error(
            ActionType::Error,
            format!(
                "Agent failure: no final answer after {} tool iterations",
                MAX_TOOL_ITERATIONS
            ),
        )
    }
}
