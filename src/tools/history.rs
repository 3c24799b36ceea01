// src/tools/history.rs

use crate::blockchain::explorer;
use crate::chains;
use crate::codec;
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{error_envelope, parse_args, Tool, ToolContext};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct HistoryParams {
    address: String,
    chain: Option<String>,
    limit: Option<usize>,
}

pub struct GetWalletTransactionsTool;

impl GetWalletTransactionsTool {
    async fn run(
        &self,
        params: HistoryParams,
        ctx: &ToolContext,
    ) -> Result<ResponseEnvelope, AgentError> {
        let chain_name = params
            .chain
            .unwrap_or_else(|| ctx.config.default_chain.clone());
        let chain = chains::resolve(&chain_name)?;
        if !codec::is_valid_address(&params.address) {
            return Err(AgentError::InvalidAddress);
        }

        let explorer_url = chain.explorer_api_url.ok_or_else(|| {
            AgentError::Upstream(format!(
                "No explorer API available for {}; transaction history is not supported there.",
                chain.id
            ))
        })?;
        let key_ref = chain.explorer_key_ref.unwrap_or_default();
        let api_key = ctx.config.explorer_key(key_ref).ok_or_else(|| {
            AgentError::CredentialMissing(format!(
                "No explorer API key set for {}. Please set {} in the environment.",
                chain.id, key_ref
            ))
        })?;

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        let records = explorer::list_transactions(
            &ctx.http,
            explorer_url,
            api_key.expose_secret(),
            &params.address,
            limit,
        )
        .await?;

        let summary = records
            .iter()
            .map(|r| {
                let short_hash: String = r.hash.chars().take(10).collect();
                format!(
                    "{}... | {} | {} | block: {} | time: {}",
                    short_hash,
                    r.direction.as_str(),
                    r.value,
                    r.block_number,
                    r.timestamp
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut data = Map::new();
        data.insert("chain".to_string(), json!(chain.id));
        data.insert("address".to_string(), json!(params.address));
        data.insert(
            "transactions".to_string(),
            serde_json::to_value(&records).unwrap_or_else(|_| json!([])),
        );
        Ok(ResponseEnvelope::success(ActionType::TransactionHistory, data).with_message(summary))
    }
}

#[async_trait]
impl Tool for GetWalletTransactionsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_wallet_transactions".to_string(),
            description: "Show recent transactions for a wallet address on a supported EVM \
                          chain, newest first."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("address", PropertySchema::string("Wallet address"))
                .property(
                    "chain",
                    PropertySchema::string(
                        "Blockchain network: polygon, ethereum, bsc, arbitrum, u2u_mainnet, \
                         u2u_testnet",
                    )
                    .with_default(json!("polygon")),
                )
                .property(
                    "limit",
                    PropertySchema::integer("Maximum number of transactions to return")
                        .with_default(json!(10)),
                )
                .required("address"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: HistoryParams = match parse_args(args, ActionType::TransactionHistory) {
            Ok(p) => p,
            Err(env) => return env,
        };
        match self.run(params, ctx).await {
            Ok(env) => env,
            Err(e) => error_envelope(ActionType::TransactionHistory, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::envelope::Status;
    use std::sync::Arc;

    fn ctx() -> ToolContext {
        ToolContext {
            http: reqwest::Client::new(),
            config: Arc::new(Config::default()),
        }
    }

    const ADDR: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    #[tokio::test]
    async fn missing_explorer_credential_is_an_error_envelope() {
        let env = GetWalletTransactionsTool
            .execute(json!({"address": ADDR, "chain": "polygon"}), &ctx())
            .await;
        assert_eq!(env.action_type, ActionType::TransactionHistory);
        assert_eq!(env.status, Status::Error);
        assert!(env
            .error
            .as_deref()
            .unwrap()
            .contains("POLYGONSCAN_API_KEY"));
    }

    #[tokio::test]
    async fn chains_without_an_explorer_report_that_directly() {
        let env = GetWalletTransactionsTool
            .execute(json!({"address": ADDR, "chain": "u2u_mainnet"}), &ctx())
            .await;
        assert_eq!(env.status, Status::Error);
        assert!(env.error.as_deref().unwrap().contains("No explorer API"));
    }
}
