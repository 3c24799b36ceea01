// src/envelope.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Discriminator for every response leaving the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Chat,
    BalanceQuery,
    Transaction,
    TransactionStatus,
    TransactionHistory,
    GasEstimation,
    WebSearchResult,
    Error,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Chat => "chat",
            ActionType::BalanceQuery => "balance_query",
            ActionType::Transaction => "transaction",
            ActionType::TransactionStatus => "transaction_status",
            ActionType::TransactionHistory => "transaction_history",
            ActionType::GasEstimation => "gas_estimation",
            ActionType::WebSearchResult => "web_search_result",
            ActionType::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
    Pending,
}

/// The one response shape every tool and the agent itself produce.
///
/// Action-specific fields live in the flattened `data` map, so a
/// serialized envelope reads as a single flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub action_type: ActionType,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn success(action_type: ActionType, data: Map<String, Value>) -> Self {
        ResponseEnvelope {
            action_type,
            status: Status::Success,
            message: None,
            error: None,
            data,
        }
    }

    pub fn error(action_type: ActionType, error: impl Into<String>) -> Self {
        ResponseEnvelope {
            action_type,
            status: Status::Error,
            message: None,
            error: Some(error.into()),
            data: Map::new(),
        }
    }

    pub fn pending(action_type: ActionType, data: Map<String, Value>) -> Self {
        ResponseEnvelope {
            action_type,
            status: Status::Pending,
            message: None,
            error: None,
            data,
        }
    }

    pub fn chat(message: impl Into<String>) -> Self {
        ResponseEnvelope {
            action_type: ActionType::Chat,
            status: Status::Success,
            message: Some(message.into()),
            error: None,
            data: Map::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
