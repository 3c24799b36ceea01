// src/codec.rs
//
// Address/hash validation and exact amount conversions. Conversions work on
// decimal digit strings end to end; nothing here round-trips through binary
// floating point, since the results become literal transaction fields.

use crate::error::AgentError;
use ethers_core::types::{Address, U256};
use ethers_core::utils::to_checksum;
use std::str::FromStr;

/// Structural address check: `0x` + 40 hex digits. Mixed-case input must
/// additionally carry a valid EIP-55 checksum; uniformly lower- or
/// upper-cased hex is accepted as-is.
pub fn is_valid_address(s: &str) -> bool {
    let Some(body) = s.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        match Address::from_str(s) {
            Ok(addr) => to_checksum(&addr, None) == s,
            Err(_) => false,
        }
    } else {
        true
    }
}

pub fn parse_address(s: &str) -> Result<Address, AgentError> {
    if !is_valid_address(s) {
        return Err(AgentError::InvalidAddress);
    }
    Address::from_str(s).map_err(|_| AgentError::InvalidAddress)
}

/// Transaction hash check: `0x` + 64 hex digits.
pub fn is_valid_tx_hash(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(body) => body.len() == 64 && body.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Convert a human-readable decimal amount to minimal on-chain units.
///
/// Fractional digits beyond `decimals` are truncated toward zero; the
/// same rule applies everywhere an amount is scaled.
pub fn to_minimal_units(amount: &str, decimals: u8) -> Result<U256, AgentError> {
    let amount = amount.trim();
    if amount.is_empty() || amount.starts_with('-') || amount.starts_with('+') {
        return Err(AgentError::InvalidAmount(amount.to_string()));
    }

    let (int_part, frac_part) = match amount.find('.') {
        Some(dot) => (&amount[..dot], &amount[dot + 1..]),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AgentError::InvalidAmount(amount.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AgentError::InvalidAmount(amount.to_string()));
    }

    let decimals = decimals as usize;
    let frac_kept = &frac_part[..frac_part.len().min(decimals)];
    let digits = format!(
        "{}{}{}",
        if int_part.is_empty() { "0" } else { int_part },
        frac_kept,
        "0".repeat(decimals - frac_kept.len())
    );
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| AgentError::InvalidAmount(amount.to_string()))
}

/// Inverse of `to_minimal_units`: format minimal units as a decimal string
/// with trailing zeros (and a trailing point) stripped.
pub fn to_human_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    if decimals == 0 {
        return digits;
    }
    let decimals = decimals as usize;
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let split = padded.len() - decimals;
    let int_part = &padded[..split];
    let frac_part = padded[split..].trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
