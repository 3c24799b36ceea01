// src/blockchain/abi.rs
//
// Minimal ABI plumbing for the ERC-20 calls this agent makes. Call data is
// a 4-byte keccak selector followed by the ABI-encoded arguments.

use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, U256};
use ethers_core::utils::keccak256;
use serde_json::Value;

fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

fn encode_call(sig: &str, tokens: Vec<Token>) -> Bytes {
    let mut out = selector(sig).to_vec();
    let mut tail = encode(&tokens);
    out.append(&mut tail);
    Bytes::from(out)
}

pub fn transfer_call_data(to: Address, amount: U256) -> Bytes {
    encode_call(
        "transfer(address,uint256)",
        vec![Token::Address(to), Token::Uint(amount)],
    )
}

pub fn approve_call_data(spender: Address, amount: U256) -> Bytes {
    encode_call(
        "approve(address,uint256)",
        vec![Token::Address(spender), Token::Uint(amount)],
    )
}

pub fn balance_of_call_data(owner: Address) -> Bytes {
    encode_call("balanceOf(address)", vec![Token::Address(owner)])
}

pub fn decimals_call_data() -> Bytes {
    encode_call("decimals()", vec![])
}

pub fn symbol_call_data() -> Bytes {
    encode_call("symbol()", vec![])
}

pub fn to_hex(data: &Bytes) -> String {
    format!("0x{}", hex::encode(data))
}

fn result_bytes(v: &Value) -> Option<Vec<u8>> {
    let s = v.as_str()?;
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).ok()
}

/// Decode a single uint256 from an eth_call result.
pub fn decode_uint(v: &Value) -> Option<U256> {
    let bytes = result_bytes(v)?;
    match decode(&[ParamType::Uint(256)], &bytes).ok()?.first() {
        Some(Token::Uint(n)) => Some(*n),
        _ => None,
    }
}

/// Decode an ABI string from an eth_call result, tolerating the bytes32
/// encoding some older tokens use for symbol().
pub fn decode_string(v: &Value) -> Option<String> {
    let bytes = result_bytes(v)?;
    if let Ok(tokens) = decode(&[ParamType::String], &bytes) {
        if let Some(Token::String(s)) = tokens.first() {
            return Some(s.clone());
        }
    }
    if let Ok(tokens) = decode(&[ParamType::FixedBytes(32)], &bytes) {
        if let Some(Token::FixedBytes(b)) = tokens.first() {
            let trimmed: Vec<u8> = b.iter().copied().take_while(|c| *c != 0u8).collect();
            return String::from_utf8(trimmed).ok();
        }
    }
    None
}
