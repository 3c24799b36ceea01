//! RPC and explorer behavior against a stubbed HTTP server.
//!
//! The mock server is shared across tests, so every mock matches on a
//! request fragment unique to its test (an address, a selector plus
//! contract, a hash), and mocks that cannot be disambiguated (eth_gasPrice
//! has an identical body everywhere) serve one shared value.

use mockito::{mock, server_url, Matcher};
use serde_json::json;
use wallet_agent::{
    blockchain::{explorer, ChainClient, Recovered, TransferRequest},
    chains,
    error::AgentError,
    U256,
};

const SENDER: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
const RECIPIENT: &str = "0x52908400098527886E0F7030069857D2E4169EE7";
const USDC_POLYGON: &str = "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174";
const USDT_POLYGON: &str = "0xC2132D05D31c914a87C6611C10748AEb04B58e8F";

fn client_for(chain: &str) -> ChainClient {
    ChainClient::new(
        reqwest::Client::new(),
        chains::resolve(chain).unwrap(),
        server_url(),
    )
}

fn rpc_result(value: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": value }).to_string()
}

fn rpc_revert() -> String {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": -32000, "message": "execution reverted" }
    })
    .to_string()
}

/// Match a JSON-RPC body on its method plus a fragment unique to the test.
fn body_with(method: &str, fragment: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::Regex(method.to_string()),
        Matcher::Regex(fragment.to_string()),
    ])
}

#[tokio::test]
async fn native_balance_parses_hex_wei() {
    let _m = mock("POST", "/")
        .match_body(body_with("eth_getBalance", "d8da6bf2"))
        .with_header("content-type", "application/json")
        .with_body(rpc_result(json!("0xde0b6b3a7640000"))) // 1 ETH
        .create();

    let wei = client_for("polygon").native_balance(SENDER).await.unwrap();
    assert_eq!(wei, U256::from_dec_str("1000000000000000000").unwrap());
}

#[tokio::test]
async fn token_balance_survives_metadata_failures() {
    // balanceOf succeeds; decimals() and symbol() revert. The balance
    // still comes back, with visibly defaulted metadata.
    let token_marker = "c2132d05";
    let _balance = mock("POST", "/")
        .match_body(body_with("70a08231", token_marker))
        .with_body(rpc_result(json!(format!("0x{:064x}", 123_456u64))))
        .create();
    let _decimals = mock("POST", "/")
        .match_body(body_with("313ce567", token_marker))
        .with_body(rpc_revert())
        .create();
    let _symbol = mock("POST", "/")
        .match_body(body_with("95d89b41", token_marker))
        .with_body(rpc_revert())
        .create();

    let (raw, metadata) = client_for("polygon")
        .token_balance(USDT_POLYGON, SENDER)
        .await
        .unwrap();
    assert_eq!(raw, U256::from(123_456u64));
    assert_eq!(metadata.decimals, Recovered::Defaulted(18));
    assert_eq!(metadata.symbol, Recovered::Defaulted("TOKEN".to_string()));
}

#[tokio::test]
async fn builds_an_unsigned_native_transfer() {
    let sender_marker = "d8da6bf2";
    let _nonce = mock("POST", "/")
        .match_body(body_with("eth_getTransactionCount", sender_marker))
        .with_body(rpc_result(json!("0x5")))
        .create();
    let _gas = mock("POST", "/")
        .match_body(body_with("eth_estimateGas", sender_marker))
        .with_body(rpc_result(json!("0x5208")))
        .create();
    let _price = mock("POST", "/")
        .match_body(Matcher::Regex("eth_gasPrice".to_string()))
        .with_body(rpc_result(json!("0x3b9aca00")))
        .create();

    let tx = client_for("ethereum")
        .build_unsigned_transfer(&TransferRequest::Native {
            from: SENDER.to_string(),
            to: RECIPIENT.to_string(),
            amount: "0.001".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(tx.chain_id, 1);
    assert_eq!(tx.value, "1000000000000000");
    assert_eq!(tx.token, "ETH");
    assert_eq!(tx.nonce, 5);
    assert_eq!(tx.gas, "21000");
    assert_eq!(tx.gas_price, "1000000000");
    assert!(tx.data.is_none());
    assert_eq!(tx.from, SENDER);
}

#[tokio::test]
async fn token_transfer_carries_abi_call_data_and_zero_value() {
    // A digits-only sender sidesteps checksum casing in assertions and
    // gives this test its own body marker.
    let sender = "0x9999999999999999999999999999999999999999";
    let token_marker = "2791bca1";
    let _decimals = mock("POST", "/")
        .match_body(body_with("313ce567", token_marker))
        .with_body(rpc_result(json!(format!("0x{:064x}", 6))))
        .create();
    let mut sym = String::new();
    sym.push_str(&format!("{:064x}", 0x20));
    sym.push_str(&format!("{:064x}", 4));
    sym.push_str(&format!("{:0<64}", hex::encode("USDC")));
    let _symbol = mock("POST", "/")
        .match_body(body_with("95d89b41", token_marker))
        .with_body(rpc_result(json!(format!("0x{}", sym))))
        .create();
    let _nonce = mock("POST", "/")
        .match_body(body_with("eth_getTransactionCount", "9999999999"))
        .with_body(rpc_result(json!("0x2")))
        .create();
    // Only the token transfer estimate carries the transfer selector.
    let _gas = mock("POST", "/")
        .match_body(body_with("eth_estimateGas", "a9059cbb"))
        .with_body(rpc_result(json!("0xd6d8")))
        .create();
    let _price = mock("POST", "/")
        .match_body(Matcher::Regex("eth_gasPrice".to_string()))
        .with_body(rpc_result(json!("0x3b9aca00")))
        .create();

    let tx = client_for("polygon")
        .build_unsigned_transfer(&TransferRequest::Erc20Transfer {
            from: sender.to_string(),
            to: RECIPIENT.to_string(),
            token: USDC_POLYGON.to_string(),
            amount: "25.5".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(tx.chain_id, 137);
    assert_eq!(tx.value, "0");
    assert_eq!(tx.to, USDC_POLYGON);
    assert_eq!(tx.token, "USDC");
    assert_eq!(tx.nonce, 2);
    let data = tx.data.expect("token transfer must carry call data");
    assert!(data.starts_with("0xa9059cbb"));
    // 25.5 scaled by 10^6, hex-encoded inside the amount word.
    assert!(data.contains(&format!("{:x}", 25_500_000u64)));
}

#[tokio::test]
async fn missing_receipt_means_pending_not_error() {
    let hash = format!("0x{}", "11".repeat(32));
    let _m = mock("POST", "/")
        .match_body(Matcher::Regex("1111111111111111".to_string()))
        .with_body(rpc_result(json!(null)))
        .create();

    let receipt = client_for("polygon")
        .transaction_receipt(&hash)
        .await
        .unwrap();
    assert!(receipt.is_none());
}

#[tokio::test]
async fn mined_receipts_report_status_block_and_gas() {
    let hash = format!("0x{}", "22".repeat(32));
    let _m = mock("POST", "/")
        .match_body(Matcher::Regex("2222222222222222".to_string()))
        .with_body(rpc_result(json!({
            "status": "0x1",
            "blockNumber": "0x1234",
            "gasUsed": "0x5208"
        })))
        .create();

    let receipt = client_for("polygon")
        .transaction_receipt(&hash)
        .await
        .unwrap()
        .expect("receipt should be present");
    assert_eq!(receipt.succeeded, Some(true));
    assert_eq!(receipt.block_number, Some(0x1234));
    assert_eq!(receipt.gas_used, Some(U256::from(21000u64)));
}

#[tokio::test]
async fn malformed_hash_fails_before_any_network_call() {
    // No mock registered: a network call would fail differently.
    let err = client_for("polygon")
        .transaction_receipt("0xdeadbeef")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::InvalidTxHash));
}

#[tokio::test]
async fn main_balances_omit_tokens_without_a_configured_address() {
    use std::collections::HashMap;
    use std::sync::Arc;
    use wallet_agent::config::Config;
    use wallet_agent::envelope::{ActionType, Status};
    use wallet_agent::tools::{balance::GetMainBalancesTool, Tool, ToolContext};

    // u2u_mainnet has no stablecoin table entries, so only the native
    // balance read happens.
    let _m = mock("POST", "/")
        .match_body(body_with("eth_getBalance", "7777777777"))
        .with_body(rpc_result(json!("0x1bc16d674ec80000"))) // 2 U2U
        .create();

    let mut config = Config::default();
    config.rpc_overrides = HashMap::from([("u2u_mainnet".to_string(), server_url())]);
    let ctx = ToolContext {
        http: reqwest::Client::new(),
        config: Arc::new(config),
    };
    let env = GetMainBalancesTool
        .execute(
            json!({
                "address": "0x7777777777777777777777777777777777777777",
                "chain": "u2u_mainnet"
            }),
            &ctx,
        )
        .await;
    assert_eq!(env.action_type, ActionType::BalanceQuery);
    assert_eq!(env.status, Status::Success);
    assert_eq!(env.data["native"]["balance"], "2");
    assert_eq!(env.data["native"]["symbol"], "U2U");
    assert!(env.data.get("usdc").is_none());
    assert!(env.data.get("usdt").is_none());
}

#[tokio::test]
async fn status_tool_reports_pending_without_a_receipt() {
    use std::collections::HashMap;
    use std::sync::Arc;
    use wallet_agent::config::Config;
    use wallet_agent::envelope::{ActionType, Status};
    use wallet_agent::tools::{status::GetTransactionStatusTool, Tool, ToolContext};

    let hash = format!("0x{}", "33".repeat(32));
    let _m = mock("POST", "/")
        .match_body(Matcher::Regex("3333333333333333".to_string()))
        .with_body(rpc_result(json!(null)))
        .create();

    let mut config = Config::default();
    config.rpc_overrides = HashMap::from([("polygon".to_string(), server_url())]);
    let ctx = ToolContext {
        http: reqwest::Client::new(),
        config: Arc::new(config),
    };
    let env = GetTransactionStatusTool
        .execute(json!({ "hash": hash, "chain": "polygon" }), &ctx)
        .await;
    assert_eq!(env.action_type, ActionType::TransactionStatus);
    assert_eq!(env.status, Status::Pending);
    assert_eq!(env.data["hash"], json!(hash));
}

#[tokio::test]
async fn explorer_history_is_limited_and_classified() {
    let queried = SENDER;
    let other = "0x0000000000000000000000000000000000000009";
    let _m = mock("GET", Matcher::Regex(r"^/\?.*apikey=history-key".to_string()))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "1",
                "message": "OK",
                "result": [
                    { "hash": "0xaaa", "to": queried.to_lowercase(), "from": other,
                      "value": "2000000000000000000", "blockNumber": "103", "timeStamp": "1700000300" },
                    { "hash": "0xbbb", "to": other, "from": queried,
                      "value": "500000000000000000", "blockNumber": "102", "timeStamp": "1700000200" },
                    { "hash": "0xccc", "to": other, "from": queried,
                      "value": "1", "blockNumber": "101", "timeStamp": "1700000100" }
                ]
            })
            .to_string(),
        )
        .create();

    let records = explorer::list_transactions(
        &reqwest::Client::new(),
        &server_url(),
        "history-key",
        queried,
        2,
    )
    .await
    .unwrap();

    assert_eq!(records.len(), 2, "limit must truncate");
    assert_eq!(records[0].hash, "0xaaa");
    assert_eq!(records[0].direction, explorer::Direction::In);
    assert_eq!(records[0].value, "2");
    assert_eq!(records[1].direction, explorer::Direction::Out);
    assert_eq!(records[1].value, "0.5");
}

#[tokio::test]
async fn explorer_error_status_becomes_upstream_error() {
    let _m = mock("GET", Matcher::Regex(r"^/\?.*apikey=bad-key".to_string()))
        .with_body(
            json!({"status": "0", "message": "NOTOK", "result": "Invalid API Key"}).to_string(),
        )
        .create();

    let err = explorer::list_transactions(
        &reqwest::Client::new(),
        &server_url(),
        "bad-key",
        SENDER,
        10,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AgentError::Upstream(_)));
    assert!(err.to_string().contains("NOTOK"));
}
