// src/blockchain/explorer.rs
//
// Transaction history comes from an etherscan-style indexing API; plain
// node RPC cannot answer "what happened to this address".

use crate::codec;
use crate::error::AgentError;
use ethers_core::types::U256;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "IN",
            Direction::Out => "OUT",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TxRecord {
    pub hash: String,
    pub direction: Direction,
    /// Native-unit value, human formatted.
    pub value: String,
    pub block_number: String,
    pub timestamp: String,
}

/// Direction is decided by one rule everywhere: the recipient matching the
/// queried address (case-insensitively) means IN. Self-transfers therefore
/// report IN.
pub fn classify_direction(to: &str, queried: &str) -> Direction {
    if to.eq_ignore_ascii_case(queried) {
        Direction::In
    } else {
        Direction::Out
    }
}

fn map_record(tx: &Value, queried: &str) -> TxRecord {
    let value = tx["value"]
        .as_str()
        .and_then(|v| U256::from_dec_str(v).ok())
        .map(|v| codec::to_human_units(v, 18))
        .unwrap_or_else(|| "0".to_string());
    TxRecord {
        hash: tx["hash"].as_str().unwrap_or_default().to_string(),
        direction: classify_direction(tx["to"].as_str().unwrap_or_default(), queried),
        value,
        block_number: tx["blockNumber"].as_str().unwrap_or_default().to_string(),
        timestamp: tx["timeStamp"].as_str().unwrap_or_default().to_string(),
    }
}

/// Fetch recent transactions for an address, newest first, truncated to
/// `limit`.
pub async fn list_transactions(
    http: &Client,
    explorer_api_url: &str,
    api_key: &str,
    address: &str,
    limit: usize,
) -> Result<Vec<TxRecord>, AgentError> {
    let resp = http
        .get(explorer_api_url)
        .query(&[
            ("module", "account"),
            ("action", "txlist"),
            ("address", address),
            ("sort", "desc"),
            ("apikey", api_key),
        ])
        .send()
        .await
        .map_err(|e| AgentError::upstream("Explorer request failed", e))?;
    let body: Value = resp
        .json()
        .await
        .map_err(|e| AgentError::upstream("Explorer response was not JSON", e))?;

    if body["status"].as_str() != Some("1") {
        let message = body["message"].as_str().unwrap_or("unknown explorer error");
        return Err(AgentError::Upstream(format!(
            "No transactions found or error: {}",
            message
        )));
    }

    let txs = body["result"].as_array().ok_or_else(|| {
        AgentError::Upstream("Explorer response missing 'result' array".to_string())
    })?;

    Ok(txs.iter().take(limit).map(|tx| map_record(tx, address)).collect())
}
