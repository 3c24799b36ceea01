// src/lib.rs

use std::sync::Arc;

pub mod agent;
pub mod api;
pub mod blockchain;
pub mod chains;
pub mod codec;
pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod tools;

// Re-export commonly used types
pub use ethers_core::types::{Address, H256, U256};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::Config>,
    /// Drives the model/tool loop for each request
    pub orchestrator: Arc<agent::orchestrator::Orchestrator>,
    /// Conversation persistence collaborator
    pub history: Arc<dyn session::HistoryStore>,
    /// Per-session write serialization
    pub session_locks: Arc<session::SessionLocks>,
}
