// src/error.rs

use thiserror::Error;

/// Failure taxonomy for the agent core.
///
/// Every variant carries a user-presentable message; tools convert these
/// into error envelopes instead of letting them propagate.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid wallet address.")]
    InvalidAddress,

    #[error("Invalid transaction hash.")]
    InvalidTxHash,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Unknown token '{0}'. Provide a contract address or supported symbol.")]
    UnknownToken(String),

    /// RPC, explorer, or search call failed, timed out, or returned a
    /// non-success status.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    CredentialMissing(String),

    /// The model call failed or returned a tool-call request we could not
    /// interpret.
    #[error("Agent failure: {0}")]
    Orchestration(String),
}

impl AgentError {
    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        AgentError::Upstream(format!("{}: {}", context, err))
    }
}
