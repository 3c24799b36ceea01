// src/blockchain/client.rs

use crate::blockchain::abi;
use crate::chains::ChainConfig;
use crate::codec;
use crate::config::Config;
use crate::error::AgentError;
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::to_checksum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_DECIMALS: u8 = 18;
const DEFAULT_SYMBOL: &str = "TOKEN";

/// A value that either came from the source of truth or fell back to a
/// documented default. Keeps the fallback visible in the type instead of
/// buried in error handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovered<T> {
    Read(T),
    Defaulted(T),
}

impl<T> Recovered<T> {
    pub fn value(&self) -> &T {
        match self {
            Recovered::Read(v) | Recovered::Defaulted(v) => v,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Recovered::Read(v) | Recovered::Defaulted(v) => v,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Recovered::Defaulted(_))
    }
}

/// ERC-20 metadata, fetched fresh on every call (proxy contracts can
/// change underneath a cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    pub decimals: Recovered<u8>,
    pub symbol: Recovered<String>,
}

/// A mined transaction's receipt. `succeeded` is None when the chain does
/// not report an execution status.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub succeeded: Option<bool>,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

/// A fully assembled transaction payload, ready for an external signer.
/// All quantity fields are decimal strings so no consumer can lose
/// precision on them. This system never signs or submits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub chain_id: u64,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas: String,
    pub gas_price: String,
    pub nonce: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub token: String,
}

/// What kind of transfer to prepare. Amounts are human-readable decimal
/// strings; scaling happens against the token's decimals at build time.
#[derive(Debug, Clone)]
pub enum TransferRequest {
    Native {
        from: String,
        to: String,
        amount: String,
    },
    Erc20Transfer {
        from: String,
        to: String,
        token: String,
        amount: String,
    },
    Erc20Approve {
        owner: String,
        spender: String,
        token: String,
        amount: String,
    },
}

/// Per-chain JSON-RPC client. Read calls get one bounded retry; anything
/// feeding a transaction build runs exactly once, since nonces and gas
/// quotes go stale.
#[derive(Clone)]
pub struct ChainClient {
    http: Client,
    chain: &'static ChainConfig,
    rpc_url: String,
}

impl ChainClient {
    pub fn new(http: Client, chain: &'static ChainConfig, rpc_url: String) -> Self {
        Self {
            http,
            chain,
            rpc_url,
        }
    }

    pub fn for_chain(http: &Client, config: &Config, name: &str) -> Result<Self, AgentError> {
        let chain = crate::chains::resolve(name)?;
        let rpc_url = config.rpc_url_for(chain);
        Ok(Self::new(http.clone(), chain, rpc_url))
    }

    pub fn chain(&self) -> &'static ChainConfig {
        self.chain
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, AgentError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let resp = self
            .http
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AgentError::upstream("RPC request failed", e))?;
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AgentError::upstream("RPC response was not JSON", e))?;
        if let Some(err) = body.get("error") {
            if !err.is_null() {
                return Err(AgentError::Upstream(format!(
                    "RPC error from {}: {}",
                    self.chain.id, err
                )));
            }
        }
        Ok(body["result"].clone())
    }

    /// One bounded retry, for idempotent reads only.
    async fn rpc_idempotent(&self, method: &str, params: Value) -> Result<Value, AgentError> {
        match self.rpc(method, params.clone()).await {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!("retrying {} on {} after: {}", method, self.chain.id, err);
                self.rpc(method, params).await
            }
        }
    }

    fn parse_quantity(result: &Value, what: &str) -> Result<U256, AgentError> {
        let hex = result.as_str().ok_or_else(|| {
            AgentError::Upstream(format!("RPC response missing '{}' quantity", what))
        })?;
        U256::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|e| AgentError::Upstream(format!("unparseable {} '{}': {}", what, hex, e)))
    }

    /// Native balance in minimal units (wei-equivalent).
    pub async fn native_balance(&self, address: &str) -> Result<U256, AgentError> {
        let addr = codec::parse_address(address)?;
        let result = self
            .rpc_idempotent("eth_getBalance", json!([format!("{:?}", addr), "latest"]))
            .await?;
        Self::parse_quantity(&result, "balance")
    }

    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Value, AgentError> {
        self.rpc_idempotent(
            "eth_call",
            json!([{ "to": format!("{:?}", to), "data": abi::to_hex(&data) }, "latest"]),
        )
        .await
    }

    /// Fetch decimals/symbol for a token. Either read may fail (reverting
    /// proxies, non-standard tokens); the result records which values fell
    /// back to defaults.
    pub async fn token_metadata(&self, token: Address) -> TokenMetadata {
        let decimals = match self
            .eth_call(token, abi::decimals_call_data())
            .await
            .ok()
            .and_then(|v| abi::decode_uint(&v))
        {
            Some(n) if n <= U256::from(u8::MAX) => Recovered::Read(n.as_u64() as u8),
            _ => Recovered::Defaulted(DEFAULT_DECIMALS),
        };
        let symbol = match self
            .eth_call(token, abi::symbol_call_data())
            .await
            .ok()
            .and_then(|v| abi::decode_string(&v))
        {
            Some(s) if !s.is_empty() => Recovered::Read(s),
            _ => Recovered::Defaulted(DEFAULT_SYMBOL.to_string()),
        };
        TokenMetadata { decimals, symbol }
    }

    /// ERC-20 balance plus metadata. A metadata failure does not fail the
    /// read; the balance figure is what the caller asked for.
    pub async fn token_balance(
        &self,
        token: &str,
        owner: &str,
    ) -> Result<(U256, TokenMetadata), AgentError> {
        let token_addr = codec::parse_address(token)?;
        let owner_addr = codec::parse_address(owner)?;
        let raw = self
            .eth_call(token_addr, abi::balance_of_call_data(owner_addr))
            .await?;
        let balance = abi::decode_uint(&raw).ok_or_else(|| {
            AgentError::Upstream(format!("undecodable balanceOf result: {}", raw))
        })?;
        let metadata = self.token_metadata(token_addr).await;
        Ok((balance, metadata))
    }

    /// Current account nonce. No retry: this feeds transaction builds.
    pub async fn transaction_count(&self, address: &str) -> Result<U256, AgentError> {
        let addr = codec::parse_address(address)?;
        let result = self
            .rpc(
                "eth_getTransactionCount",
                json!([format!("{:?}", addr), "latest"]),
            )
            .await?;
        Self::parse_quantity(&result, "nonce")
    }

    pub async fn gas_price(&self) -> Result<U256, AgentError> {
        let result = self.rpc_idempotent("eth_gasPrice", json!([])).await?;
        Self::parse_quantity(&result, "gasPrice")
    }

    /// Estimate gas for a call object. No retry: estimates are quotes
    /// against current state.
    pub async fn estimate_gas(&self, call: Value) -> Result<U256, AgentError> {
        let result = self.rpc("eth_estimateGas", json!([call])).await?;
        Self::parse_quantity(&result, "gas estimate")
    }

    /// Receipt lookup. `None` means the transaction is pending or unknown,
    /// which is not an error; the caller decides whether to ask again.
    pub async fn transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, AgentError> {
        if !codec::is_valid_tx_hash(hash) {
            return Err(AgentError::InvalidTxHash);
        }
        let result = self
            .rpc_idempotent("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        let succeeded = result["status"]
            .as_str()
            .map(|s| s == "0x1");
        let block_number = result["blockNumber"]
            .as_str()
            .and_then(|s| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok());
        let gas_used = result["gasUsed"]
            .as_str()
            .and_then(|s| U256::from_str_radix(s.trim_start_matches("0x"), 16).ok());
        Ok(Some(TransactionReceipt {
            succeeded,
            block_number,
            gas_used,
        }))
    }

    /// Assemble an unsigned transaction: chain id, fresh nonce, gas
    /// estimate, current gas price, and (for contract calls) ABI call
    /// data. No key is ever involved; signing happens elsewhere.
    pub async fn build_unsigned_transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<UnsignedTransaction, AgentError> {
        match request {
            TransferRequest::Native { from, to, amount } => {
                let from_addr = codec::parse_address(from)?;
                let to_addr = codec::parse_address(to)?;
                let value = codec::to_minimal_units(amount, DEFAULT_DECIMALS)?;
                self.assemble(
                    from_addr,
                    to_addr,
                    value,
                    None,
                    self.chain.native_symbol.to_string(),
                )
                .await
            }
            TransferRequest::Erc20Transfer {
                from,
                to,
                token,
                amount,
            } => {
                let from_addr = codec::parse_address(from)?;
                let to_addr = codec::parse_address(to)?;
                let token_addr = codec::parse_address(token)?;
                let (value, symbol) = self.scaled_token_amount(token_addr, token, amount).await?;
                let data = abi::transfer_call_data(to_addr, value);
                self.assemble(from_addr, token_addr, U256::zero(), Some(data), symbol)
                    .await
            }
            TransferRequest::Erc20Approve {
                owner,
                spender,
                token,
                amount,
            } => {
                let owner_addr = codec::parse_address(owner)?;
                let spender_addr = codec::parse_address(spender)?;
                let token_addr = codec::parse_address(token)?;
                let (value, symbol) = self.scaled_token_amount(token_addr, token, amount).await?;
                let data = abi::approve_call_data(spender_addr, value);
                self.assemble(owner_addr, token_addr, U256::zero(), Some(data), symbol)
                    .await
            }
        }
    }

    /// Scale a human amount by the token's decimals. A defaulted decimals
    /// read is fine for displaying a balance but not for deriving an
    /// on-chain amount, so it is an error here.
    async fn scaled_token_amount(
        &self,
        token_addr: Address,
        token: &str,
        amount: &str,
    ) -> Result<(U256, String), AgentError> {
        let metadata = self.token_metadata(token_addr).await;
        let decimals = match metadata.decimals {
            Recovered::Read(d) => d,
            Recovered::Defaulted(_) => {
                return Err(AgentError::Upstream(format!(
                    "Could not read decimals for token {}",
                    token
                )))
            }
        };
        let value = codec::to_minimal_units(amount, decimals)?;
        Ok((value, metadata.symbol.into_value()))
    }

    async fn assemble(
        &self,
        from: Address,
        to: Address,
        value: U256,
        data: Option<Bytes>,
        token: String,
    ) -> Result<UnsignedTransaction, AgentError> {
        let nonce = self.transaction_count(&format!("{:?}", from)).await?;

        let mut call = json!({
            "from": format!("{:?}", from),
            "to": format!("{:?}", to),
            "value": format!("0x{:x}", value),
        });
        if let Some(d) = &data {
            call["data"] = json!(abi::to_hex(d));
        }
        let gas = self.estimate_gas(call).await?;
        let gas_price = self.gas_price().await?;

        Ok(UnsignedTransaction {
            chain_id: self.chain.chain_id,
            from: to_checksum(&from, None),
            to: to_checksum(&to, None),
            value: value.to_string(),
            gas: gas.to_string(),
            gas_price: gas_price.to_string(),
            nonce: nonce.as_u64(),
            data: data.map(|d| abi::to_hex(&d)),
            token,
        })
    }
}
