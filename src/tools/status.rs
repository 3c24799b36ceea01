// src/tools/status.rs

use crate::blockchain::ChainClient;
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{error_envelope, parse_args, Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
struct StatusParams {
    hash: String,
    chain: Option<String>,
}

pub struct GetTransactionStatusTool;

impl GetTransactionStatusTool {
    async fn run(
        &self,
        params: StatusParams,
        ctx: &ToolContext,
    ) -> Result<ResponseEnvelope, AgentError> {
        let chain_name = params
            .chain
            .unwrap_or_else(|| ctx.config.default_chain.clone());
        let client = ChainClient::for_chain(&ctx.http, &ctx.config, &chain_name)?;

        let mut data = Map::new();
        data.insert("chain".to_string(), json!(client.chain().id));
        data.insert("hash".to_string(), json!(params.hash));

        match client.transaction_receipt(&params.hash).await? {
            // No receipt yet: the transaction is pending or unknown. The
            // caller decides whether to ask again.
            None => Ok(ResponseEnvelope::pending(ActionType::TransactionStatus, data)
                .with_message("Transaction is pending or not yet indexed.".to_string())),
            Some(receipt) => {
                let outcome = match receipt.succeeded {
                    Some(true) | None => "success",
                    Some(false) => "failed",
                };
                data.insert("outcome".to_string(), json!(outcome));
                if let Some(block) = receipt.block_number {
                    data.insert("block_number".to_string(), json!(block));
                }
                if let Some(gas) = receipt.gas_used {
                    data.insert("gas_used".to_string(), json!(gas.to_string()));
                }
                let message = format!("Transaction {}: {}", params.hash, outcome);
                Ok(ResponseEnvelope::success(ActionType::TransactionStatus, data)
                    .with_message(message))
            }
        }
    }
}

#[async_trait]
impl Tool for GetTransactionStatusTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_transaction_status".to_string(),
            description: "Check whether a transaction is pending, succeeded, or failed, \
                          with block number and gas used once mined."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("hash", PropertySchema::string("Transaction hash (0x-prefixed)"))
                .property(
                    "chain",
                    PropertySchema::string(
                        "Blockchain network: polygon, ethereum, bsc, arbitrum, u2u_mainnet, \
                         u2u_testnet",
                    )
                    .with_default(json!("polygon")),
                )
                .required("hash"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: StatusParams = match parse_args(args, ActionType::TransactionStatus) {
            Ok(p) => p,
            Err(env) => return env,
        };
        match self.run(params, ctx).await {
            Ok(env) => env,
            Err(e) => error_envelope(ActionType::TransactionStatus, e),
        }
    }
}
