// src/config.rs

use anyhow::{Context, Result};
use secrecy::SecretString;
use std::collections::HashMap;
use std::env;

const DEFAULT_MODEL_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

// A struct holding all configuration, loaded once at startup from the
// environment (.env supported). Credentials stay wrapped in SecretString
// and are only exposed at the point of an outbound request.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Chain settings
    pub default_chain: String,
    /// Optional per-chain RPC URL overrides (JSON map chain name -> URL).
    pub rpc_overrides: HashMap<String, String>,
    pub request_timeout_secs: u64,

    // Language model settings (OpenAI-compatible chat completions)
    pub model_endpoint: String,
    pub model_name: String,
    pub model_api_key: Option<SecretString>,
    pub model_max_tokens: u32,

    // External services
    pub serpapi_api_key: Option<SecretString>,
    /// Explorer credentials keyed by the registry's `explorer_key_ref`.
    pub explorer_api_keys: HashMap<String, SecretString>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let rpc_overrides = match env::var("CHAIN_RPC_URLS") {
            Ok(raw) => serde_json::from_str(&raw).context("Invalid CHAIN_RPC_URLS JSON format")?,
            Err(_) => HashMap::new(),
        };

        let mut explorer_api_keys = HashMap::new();
        for key_ref in [
            "ETHERSCAN_API_KEY",
            "POLYGONSCAN_API_KEY",
            "BSCSCAN_API_KEY",
            "ARBISCAN_API_KEY",
        ] {
            if let Ok(value) = env::var(key_ref) {
                if !value.is_empty() {
                    explorer_api_keys.insert(key_ref.to_string(), SecretString::new(value));
                }
            }
        }

        let model_api_key = env::var("MODEL_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::new);

        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            default_chain: env::var("DEFAULT_CHAIN").unwrap_or_else(|_| "polygon".to_string()),
            rpc_overrides,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("REQUEST_TIMEOUT_SECS must be a valid number")?,
            model_endpoint: env::var("MODEL_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_MODEL_ENDPOINT.to_string()),
            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            model_api_key,
            model_max_tokens: env::var("MODEL_MAX_TOKENS")
                .unwrap_or_else(|_| "4096".to_string())
                .parse()
                .context("MODEL_MAX_TOKENS must be a valid number")?,
            serpapi_api_key: env::var("SERPAPI_API_KEY")
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::new),
            explorer_api_keys,
        })
    }

    /// Resolve an explorer credential by the registry's reference name.
    pub fn explorer_key(&self, key_ref: &str) -> Option<&SecretString> {
        self.explorer_api_keys.get(key_ref)
    }

    /// Effective RPC URL for a chain: override first, registry default otherwise.
    pub fn rpc_url_for(&self, chain: &crate::chains::ChainConfig) -> String {
        self.rpc_overrides
            .get(chain.id)
            .cloned()
            .unwrap_or_else(|| chain.rpc_url.to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            default_chain: "polygon".to_string(),
            rpc_overrides: HashMap::new(),
            request_timeout_secs: 10,
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_name: "gemini-2.0-flash".to_string(),
            model_api_key: None,
            model_max_tokens: 4096,
            serpapi_api_key: None,
            explorer_api_keys: HashMap::new(),
        }
    }
}
