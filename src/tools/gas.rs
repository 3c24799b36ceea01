// src/tools/gas.rs

use crate::blockchain::{abi, ChainClient};
use crate::codec;
use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{error_envelope, parse_args, Tool, ToolContext};
use async_trait::async_trait;
use ethers_core::types::U256;
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
struct GasParams {
    sender: String,
    recipient: String,
    amount: Option<String>,
    token_address: Option<String>,
    chain: Option<String>,
}

pub struct EstimateGasTool;

impl EstimateGasTool {
    async fn run(&self, params: GasParams, ctx: &ToolContext) -> Result<ResponseEnvelope, AgentError> {
        let chain_name = params
            .chain
            .unwrap_or_else(|| ctx.config.default_chain.clone());
        let client = ChainClient::for_chain(&ctx.http, &ctx.config, &chain_name)?;
        let sender = codec::parse_address(&params.sender)?;
        let recipient = codec::parse_address(&params.recipient)?;

        let call = match params.token_address.as_deref() {
            // Token transfer: gas depends on the contract, not the value.
            Some(token) => {
                let token_addr = codec::parse_address(token)?;
                let metadata = client.token_metadata(token_addr).await;
                let amount = params.amount.as_deref().unwrap_or("0");
                let value = codec::to_minimal_units(amount, *metadata.decimals.value())?;
                let data = abi::transfer_call_data(recipient, value);
                json!({
                    "from": format!("{:?}", sender),
                    "to": format!("{:?}", token_addr),
                    "data": abi::to_hex(&data),
                })
            }
            None => {
                let amount = params.amount.as_deref().unwrap_or("0");
                let value = codec::to_minimal_units(amount, 18)?;
                json!({
                    "from": format!("{:?}", sender),
                    "to": format!("{:?}", recipient),
                    "value": format!("0x{:x}", value),
                })
            }
        };

        let gas: U256 = client.estimate_gas(call).await?;
        let mut data = Map::new();
        data.insert("chain".to_string(), json!(client.chain().id));
        data.insert("gas".to_string(), json!(gas.to_string()));
        let message = format!("Estimated gas: {} units", gas);
        Ok(ResponseEnvelope::success(ActionType::GasEstimation, data).with_message(message))
    }
}

#[async_trait]
impl Tool for EstimateGasTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "estimate_gas".to_string(),
            description: "Estimate the gas units a native or ERC-20 transfer would consume."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("sender", PropertySchema::string("Sender wallet address"))
                .property("recipient", PropertySchema::string("Recipient wallet address"))
                .property(
                    "amount",
                    PropertySchema::string("Amount to transfer, e.g. '0.001'"),
                )
                .property(
                    "token_address",
                    PropertySchema::string(
                        "ERC-20 contract address; omit to estimate a native transfer",
                    ),
                )
                .property(
                    "chain",
                    PropertySchema::string(
                        "Blockchain network: polygon, ethereum, bsc, arbitrum, u2u_mainnet, \
                         u2u_testnet",
                    )
                    .with_default(json!("polygon")),
                )
                .required("sender")
                .required("recipient"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: GasParams = match parse_args(args, ActionType::GasEstimation) {
            Ok(p) => p,
            Err(env) => return env,
        };
        match self.run(params, ctx).await {
            Ok(env) => env,
            Err(e) => error_envelope(ActionType::GasEstimation, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::envelope::Status;
    use std::sync::Arc;

    #[tokio::test]
    async fn invalid_sender_is_rejected_before_any_network_call() {
        let ctx = ToolContext {
            http: reqwest::Client::new(),
            config: Arc::new(Config::default()),
        };
        let env = EstimateGasTool
            .execute(
                json!({
                    "sender": "0x123",
                    "recipient": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
                    "amount": "1"
                }),
                &ctx,
            )
            .await;
        assert_eq!(env.action_type, ActionType::GasEstimation);
        assert_eq!(env.status, Status::Error);
        assert_eq!(env.error.as_deref(), Some("Invalid wallet address."));
    }
}
