// src/chains.rs

use crate::error::AgentError;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// Static configuration for one supported EVM network.
///
/// The registry is fixed at compile time; chains without an explorer API
/// (the U2U networks) simply have no history support.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Canonical lowercase chain name.
    pub id: &'static str,
    pub rpc_url: &'static str,
    pub chain_id: u64,
    pub explorer_api_url: Option<&'static str>,
    /// Name of the environment credential for the explorer API.
    pub explorer_key_ref: Option<&'static str>,
    pub native_symbol: &'static str,
}

static CHAINS: &[ChainConfig] = &[
    ChainConfig {
        id: "polygon",
        rpc_url: "https://polygon-rpc.com/",
        chain_id: 137,
        explorer_api_url: Some("https://api.polygonscan.com/api"),
        explorer_key_ref: Some("POLYGONSCAN_API_KEY"),
        native_symbol: "MATIC",
    },
    ChainConfig {
        id: "ethereum",
        rpc_url: "https://ethereum.publicnode.com",
        chain_id: 1,
        explorer_api_url: Some("https://api.etherscan.io/api"),
        explorer_key_ref: Some("ETHERSCAN_API_KEY"),
        native_symbol: "ETH",
    },
    ChainConfig {
        id: "bsc",
        rpc_url: "https://bsc-dataseed.binance.org/",
        chain_id: 56,
        explorer_api_url: Some("https://api.bscscan.com/api"),
        explorer_key_ref: Some("BSCSCAN_API_KEY"),
        native_symbol: "BNB",
    },
    ChainConfig {
        id: "arbitrum",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        chain_id: 42161,
        explorer_api_url: Some("https://api.arbiscan.io/api"),
        explorer_key_ref: Some("ARBISCAN_API_KEY"),
        native_symbol: "ETH",
    },
    ChainConfig {
        id: "u2u_mainnet",
        rpc_url: "https://rpc-mainnet.u2u.xyz",
        chain_id: 39,
        explorer_api_url: None,
        explorer_key_ref: None,
        native_symbol: "U2U",
    },
    ChainConfig {
        id: "u2u_testnet",
        rpc_url: "https://rpc-nebulas-testnet.u2u.xyz",
        chain_id: 2484,
        explorer_api_url: None,
        explorer_key_ref: None,
        native_symbol: "U2U",
    },
];

lazy_static! {
    /// Well-known stablecoin addresses per chain. Chains may legitimately
    /// lack an entry for a symbol (no deployment); lookups then fail with
    /// UnknownToken.
    static ref TOKEN_MAP: HashMap<&'static str, HashMap<&'static str, &'static str>> = {
        let mut map = HashMap::new();
        map.insert("ethereum", HashMap::from([
            ("USDC", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            ("USDT", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
        ]));
        map.insert("polygon", HashMap::from([
            ("USDC", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
            ("USDT", "0xC2132D05D31c914a87C6611C10748AEb04B58e8F"),
        ]));
        map.insert("bsc", HashMap::from([
            ("USDC", "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d"),
            ("USDT", "0x55d398326f99059fF775485246999027B3197955"),
        ]));
        map.insert("arbitrum", HashMap::from([
            ("USDC", "0xFF970A61A04b1cA14834A43f5de4533eBDDB5CC8"),
            ("USDT", "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9"),
        ]));
        map.insert("u2u_mainnet", HashMap::new());
        map.insert("u2u_testnet", HashMap::from([
            ("USDC", "0xfb11bba87bc7f418448df1fabb9400cafd590e6f"),
            ("USDT", "0x88ed59f4d491c7b90fe4efe6734c25193e1ca6ec"),
        ]));
        map
    };
}

/// Resolve a chain by name, case-insensitively.
pub fn resolve(name: &str) -> Result<&'static ChainConfig, AgentError> {
    let wanted = name.trim().to_lowercase();
    CHAINS
        .iter()
        .find(|c| c.id == wanted)
        .ok_or_else(|| AgentError::UnsupportedChain(name.to_string()))
}

/// Look up a well-known token symbol on a chain. Symbols match
/// case-insensitively; returned addresses keep their configured casing.
pub fn token_address(chain: &str, symbol: &str) -> Option<&'static str> {
    let wanted = symbol.trim().to_uppercase();
    TOKEN_MAP
        .get(chain.trim().to_lowercase().as_str())
        .and_then(|tokens| tokens.get(wanted.as_str()))
        .copied()
}

pub fn supported_chains() -> Vec<&'static str> {
    CHAINS.iter().map(|c| c.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_case_insensitive() {
        for name in ["polygon", "POLYGON", "Polygon", " pOlYgOn "] {
            let cfg = resolve(name).unwrap();
            assert_eq!(cfg.chain_id, 137);
            assert_eq!(cfg.native_symbol, "MATIC");
        }
    }

    #[test]
    fn resolve_rejects_unknown_chain() {
        assert!(matches!(
            resolve("solana"),
            Err(AgentError::UnsupportedChain(_))
        ));
    }

    #[test]
    fn every_chain_resolves_to_itself() {
        for name in supported_chains() {
            assert_eq!(resolve(name).unwrap().id, name);
        }
    }

    #[test]
    fn token_lookup_is_case_insensitive_on_symbol() {
        let lower = token_address("polygon", "usdc").unwrap();
        let upper = token_address("polygon", "USDC").unwrap();
        assert_eq!(lower, upper);
        // Address casing is preserved as configured.
        assert_eq!(lower, "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174");
    }

    #[test]
    fn u2u_mainnet_has_no_stablecoins() {
        assert!(token_address("u2u_mainnet", "USDC").is_none());
        assert!(token_address("u2u_mainnet", "USDT").is_none());
    }
}
