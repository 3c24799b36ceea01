// src/tools/transfer.rs
//
// Transaction preparation tools. Everything here produces an
// UnsignedTransaction for an external signer; no tool in this module can
// sign or submit anything.

use crate::blockchain::{ChainClient, TransferRequest, UnsignedTransaction};
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

fn transaction_envelope(tx: UnsignedTransaction, summary: String) -> ResponseEnvelope {
    let mut data = Map::new();
    data.insert(
        "transaction".to_string(),
        serde_json::to_value(&tx).unwrap_or_else(|_| json!({})),
    );
    ResponseEnvelope::success(ActionType::Transaction, data).with_message(summary)
}

async fn build(
    ctx: &ToolContext,
    chain: Option<String>,
    request: TransferRequest,
) -> Result<(ChainClient, UnsignedTransaction), AgentError> {
    let chain_name = chain.unwrap_or_else(|| ctx.config.default_chain.clone());
    let client = ChainClient::for_chain(&ctx.http, &ctx.config, &chain_name)?;
    let tx = client.build_unsigned_transfer(&request).await?;
    Ok((client, tx))
}

#[derive(Debug, Deserialize)]
struct NativeTransferParams {
    sender: String,
    recipient: String,
    amount: String,
    chain: Option<String>,
}

pub struct PrepareNativeTransferTool;

#[async_trait]
impl Tool for PrepareNativeTransferTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "prepare_native_transfer".to_string(),
            description: "Prepare an unsigned native-token transfer (e.g. ETH, MATIC, BNB) \
                          for external signing. Never signs or sends anything."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("sender", PropertySchema::string("Sender wallet address"))
                .property("recipient", PropertySchema::string("Recipient wallet address"))
                .property(
                    "amount",
                    PropertySchema::string("Amount in native units, e.g. '0.001'"),
                )
                .property("chain", chain_property())
                .required("sender")
                .required("recipient")
                .required("amount"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: NativeTransferParams = match parse_args(args, ActionType::Transaction) {
            Ok(p) => p,
            Err(env) => return env,
        };
        let request = TransferRequest::Native {
            from: params.sender,
            to: params.recipient,
            amount: params.amount.clone(),
        };
        match build(ctx, params.chain, request).await {
            Ok((client, tx)) => {
                let summary = format!(
                    "Prepared unsigned transfer of {} {} on {}; sign it externally to send.",
                    params.amount,
                    tx.token,
                    client.chain().id
                );
                transaction_envelope(tx, summary)
            }
            Err(e) => error_envelope(ActionType::Transaction, e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenTransferParams {
    sender: String,
    recipient: String,
    token_address: String,
    amount: String,
    chain: Option<String>,
}

pub struct PrepareTokenTransferTool;

#[async_trait]
impl Tool for PrepareTokenTransferTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "prepare_token_transfer".to_string(),
            description: "Prepare an unsigned ERC-20 transfer(address,uint256) transaction \
                          for external signing."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("sender", PropertySchema::string("Sender wallet address"))
                .property("recipient", PropertySchema::string("Recipient wallet address"))
                .property(
                    "token_address",
                    PropertySchema::string("ERC-20 contract address"),
                )
                .property(
                    "amount",
                    PropertySchema::string("Amount in token units, e.g. '25.5'"),
                )
                .property("chain", chain_property())
                .required("sender")
                .required("recipient")
                .required("token_address")
                .required("amount"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: TokenTransferParams = match parse_args(args, ActionType::Transaction) {
            Ok(p) => p,
            Err(env) => return env,
        };
        let request = TransferRequest::Erc20Transfer {
            from: params.sender,
            to: params.recipient,
            token: params.token_address,
            amount: params.amount.clone(),
        };
        match build(ctx, params.chain, request).await {
            Ok((client, tx)) => {
                let summary = format!(
                    "Prepared unsigned transfer of {} {} on {}; sign it externally to send.",
                    params.amount,
                    tx.token,
                    client.chain().id
                );
                transaction_envelope(tx, summary)
            }
            Err(e) => error_envelope(ActionType::Transaction, e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenApprovalParams {
    owner: String,
    spender: String,
    token_address: String,
    amount: String,
    chain: Option<String>,
}

pub struct PrepareTokenApprovalTool;

#[async_trait]
impl Tool for PrepareTokenApprovalTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "prepare_token_approval".to_string(),
            description: "Prepare an unsigned ERC-20 approve(address,uint256) transaction \
                          for external signing."
                .to_string(),
            input_schema: ToolInputSchema::new()
                .property("owner", PropertySchema::string("Token owner wallet address"))
                .property("spender", PropertySchema::string("Spender address to approve"))
                .property(
                    "token_address",
                    PropertySchema::string("ERC-20 contract address"),
                )
                .property(
                    "amount",
                    PropertySchema::string("Allowance in token units, e.g. '100'"),
                )
                .property("chain", chain_property())
                .required("owner")
                .required("spender")
                .required("token_address")
                .required("amount"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: TokenApprovalParams = match parse_args(args, ActionType::Transaction) {
            Ok(p) => p,
            Err(env) => return env,
        };
        let request = TransferRequest::Erc20Approve {
            owner: params.owner,
            spender: params.spender,
            token: params.token_address,
            amount: params.amount.clone(),
        };
        match build(ctx, params.chain, request).await {
            Ok((client, tx)) => {
                let summary = format!(
                    "Prepared unsigned approval of {} {} on {}; sign it externally to send.",
                    params.amount,
                    tx.token,
                    client.chain().id
                );
                transaction_envelope(tx, summary)
            }
            Err(e) => error_envelope(ActionType::Transaction, e),
        }
    }
}
