// src/tools/mod.rs

pub mod balance;
pub mod gas;
pub mod history;
pub mod math;
pub mod schema;
pub mod search;
pub mod status;
pub mod transfer;

use crate::config::Config;
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::ToolDefinition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared collaborators handed to every tool invocation. Tools read their
/// arguments and this context; they never touch conversation state.
#[derive(Clone)]
pub struct ToolContext {
    pub http: reqwest::Client,
    pub config: Arc<Config>,
}

/// One invocable action. Implementations catch their own failures and
/// return an error envelope; `execute` is infallible by contract.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope;
}

/// Name-keyed lookup table over the closed tool set.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the full tool set.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(math::AddTool));
        registry.register(Arc::new(math::SubTool));
        registry.register(Arc::new(math::MulTool));
        registry.register(Arc::new(search::WebSearchTool));
        registry.register(Arc::new(balance::GetBalanceTool));
        registry.register(Arc::new(balance::GetMainBalancesTool));
        registry.register(Arc::new(history::GetWalletTransactionsTool));
        registry.register(Arc::new(transfer::PrepareNativeTransferTool));
        registry.register(Arc::new(transfer::PrepareTokenTransferTool));
        registry.register(Arc::new(transfer::PrepareTokenApprovalTool));
        registry.register(Arc::new(status::GetTransactionStatusTool));
        registry.register(Arc::new(gas::EstimateGasTool));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.definition().name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

/// Deserialize tool arguments, mapping any mismatch onto an error envelope
/// carrying the tool's own action type.
pub(crate) fn parse_args<T: DeserializeOwned>(
    args: Value,
    action_type: ActionType,
) -> Result<T, ResponseEnvelope> {
    serde_json::from_value(args).map_err(|e| {
        ResponseEnvelope::error(action_type, format!("Invalid tool arguments: {}", e))
    })
}

/// Shorthand for tools converting a typed failure into their envelope.
pub(crate) fn error_envelope(action_type: ActionType, err: AgentError) -> ResponseEnvelope {
    ResponseEnvelope::error(action_type, err.to_string())
}
