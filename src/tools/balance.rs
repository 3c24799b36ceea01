// src/tools/balance.rs

use crate::blockchain::ChainClient;
use crate::chains;
use crate::codec;
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{error_envelope, parse_args, Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

fn chain_property() -> PropertySchema {
    PropertySchema::string(
        "Blockchain network: polygon, ethereum, bsc, arbitrum, u2u_mainnet, u2u_testnet",
    )
    .with_default(json!("polygon"))
}

/// Resolve a token reference: a literal valid address wins, then the
/// per-chain symbol table. Unknown symbols are an error, never a default.
fn resolve_token(chain: &str, token: &str) -> Result<String, AgentError> {
    if codec::is_valid_address(token) {
        return Ok(token.to_string());
    }
    chains::token_address(chain, token)
        .map(|addr| addr.to_string())
        .ok_or_else(|| AgentError::UnknownToken(token.to_string()))
}

#[derive(Debug, Deserialize)]
struct BalanceParams {
    address: String,
    chain: Option<String>,
    token: Option<String>,
}

pub struct GetBalanceTool;

impl GetBalanceTool {
    async fn run(&self, params: BalanceParams, ctx: &ToolContext) -> Result<ResponseEnvelope, AgentError> {
        let chain_name = params
            .chain
            .unwrap_or_else(|| ctx.config.default_chain.clone());
        let client = ChainClient::for_chain(&ctx.http, &ctx.config, &chain_name)?;
        if !codec::is_valid_address(&params.address) {
            return Err(AgentError::InvalidAddress);
        }

        let mut data = Map::new();
        data.insert("chain".to_string(), json!(client.chain().id));
        data.insert("address".to_string(), json!(params.address));

        let token = params
            .token
            .as_deref()
            .filter(|t| !t.eq_ignore_ascii_case("native"));
        let (balance, symbol) = match token {
            None => {
                let wei = client.native_balance(&params.address).await?;
                (
                    codec::to_human_units(wei, 18),
                    client.chain().native_symbol.to_string(),
                )
            }
            Some(token) => {
                let token_address = resolve_token(client.chain().id, token)?;
                let (raw, metadata) = client.token_balance(&token_address, &params.address).await?;
                (
                    codec::to_human_units(raw, *metadata.decimals.value()),
                    metadata.symbol.into_value(),
                )
            }
        };

        data.insert("balance".to_string(), json!(balance));
        data.insert("symbol".to_string(), json!(symbol));
        let message = format!("{} {}", balance, symbol);
        Ok(ResponseEnvelope::success(ActionType::BalanceQuery, data).with_message(message))
    }
}

#[async_trait]
impl Tool for GetBalanceTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_balance".to_string(),
            description: "Get the balance of a wallet address on a supported EVM chain. \
                          Token may be 'native', a known symbol (USDC, USDT), or an ERC-20 \
                          contract address."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("address", PropertySchema::string("Wallet address to check"))
                .property("chain", chain_property())
                .property(
                    "token",
                    PropertySchema::string(
                        "Token to check: omit or 'native' for the native token, a symbol, \
                         or a contract address",
                    ),
                )
                .required("address"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: BalanceParams = match parse_args(args, ActionType::BalanceQuery) {
            Ok(p) => p,
            Err(env) => return env,
        };
        match self.run(params, ctx).await {
            Ok(env) => env,
            Err(e) => error_envelope(ActionType::BalanceQuery, e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MainBalancesParams {
    address: String,
    chain: Option<String>,
}

pub struct GetMainBalancesTool;

impl GetMainBalancesTool {
    async fn run(
        &self,
        params: MainBalancesParams,
        ctx: &ToolContext,
    ) -> Result<ResponseEnvelope, AgentError> {
        let chain_name = params
            .chain
            .unwrap_or_else(|| ctx.config.default_chain.clone());
        let client = ChainClient::for_chain(&ctx.http, &ctx.config, &chain_name)?;
        if !codec::is_valid_address(&params.address) {
            return Err(AgentError::InvalidAddress);
        }

        // The native balance is the one read that must succeed.
        let wei = client.native_balance(&params.address).await?;
        let native_balance = codec::to_human_units(wei, 18);
        let native_symbol = client.chain().native_symbol;

        let mut data = Map::new();
        data.insert("chain".to_string(), json!(client.chain().id));
        data.insert("address".to_string(), json!(params.address));
        data.insert(
            "native".to_string(),
            json!({ "balance": native_balance, "symbol": native_symbol }),
        );

        let mut summary = vec![format!("Native: {} {}", native_balance, native_symbol)];
        for symbol in ["USDC", "USDT"] {
            // Tokens with no deployment on this chain are omitted, not errors.
            let Some(token_address) = chains::token_address(client.chain().id, symbol) else {
                continue;
            };
            // A failing token read drops that token from the summary.
            if let Ok((raw, metadata)) = client.token_balance(token_address, &params.address).await
            {
                let balance = codec::to_human_units(raw, *metadata.decimals.value());
                data.insert(
                    symbol.to_lowercase(),
                    json!({ "balance": balance, "symbol": symbol }),
                );
                summary.push(format!("{}: {}", symbol, balance));
            }
        }

        Ok(ResponseEnvelope::success(ActionType::BalanceQuery, data)
            .with_message(summary.join("\n")))
    }
}

#[async_trait]
impl Tool for GetMainBalancesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_main_balances".to_string(),
            description: "Get the main token balances (native + USDC + USDT) for a wallet \
                          address on a supported EVM chain."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("address", PropertySchema::string("Wallet address to check"))
                .property("chain", chain_property())
                .required("address"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: MainBalancesParams = match parse_args(args, ActionType::BalanceQuery) {
            Ok(p) => p,
            Err(env) => return env,
        };
        match self.run(params, ctx).await {
            Ok(env) => env,
            Err(e) => error_envelope(ActionType::BalanceQuery, e),
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

    #[tokio::test]
    async fn invalid_address_is_rejected_before_any_network_call() {
        let env = GetBalanceTool
            .execute(json!({"address": "0x123", "chain": "polygon"}), &ctx())
            .await;
        assert_eq!(env.action_type, ActionType::BalanceQuery);
        assert_eq!(env.status, Status::Error);
        assert_eq!(env.error.as_deref(), Some("Invalid wallet address."));
    }

    #[tokio::test]
    async fn unsupported_chain_is_rejected() {
        let env = GetBalanceTool
            .execute(
                json!({"address": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045", "chain": "solana"}),
                &ctx(),
            )
            .await;
        assert_eq!(env.status, Status::Error);
        assert!(env.error.as_deref().unwrap().contains("Unsupported chain"));
    }

    #[tokio::test]
    async fn unknown_symbol_is_an_error_not_a_default() {
        let env = GetBalanceTool
            .execute(
                json!({
                    "address": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
                    "chain": "u2u_mainnet",
                    "token": "USDC"
                }),
                &ctx(),
            )
            .await;
        assert_eq!(env.status, Status::Error);
        assert!(env.error.as_deref().unwrap().contains("Unknown token"));
    }

    #[test]
    fn token_resolution_prefers_literal_addresses() {
        let addr = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
        assert_eq!(resolve_token("polygon", addr).unwrap(), addr);
        assert_eq!(
            resolve_token("polygon", "usdt").unwrap(),
            "0xC2132D05D31c914a87C6611C10748AEb04B58e8F"
        );
        assert!(resolve_token("polygon", "DOGE").is_err());
    }
}
