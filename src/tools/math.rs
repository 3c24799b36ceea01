// src/tools/math.rs

use crate::envelope::{ActionType, ResponseEnvelope};
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{parse_args, Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct PairParams {
    a: f64,
    b: f64,
}

fn pair_schema() -> ToolInputSchema {
    ToolInputSchema::new()
        .property("a", PropertySchema::number("First operand"))
        .property("b", PropertySchema::number("Second operand"))
        .required("a")
        .required("b")
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn result_envelope(result: f64) -> ResponseEnvelope {
    let text = format_number(result);
    let mut data = serde_json::Map::new();
    data.insert("result".to_string(), json!(result));
    ResponseEnvelope::success(ActionType::Chat, data).with_message(text)
}

pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "add".to_string(),
            description: "Adds two numbers together".to_string(),
            input_schema: pair_schema(),
        }
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> ResponseEnvelope {
        let params: PairParams = match parse_args(args, ActionType::Chat) {
            Ok(p) => p,
            Err(env) => return env,
        };
        result_envelope(params.a + params.b)
    }
}

pub struct SubTool;

#[async_trait]
impl Tool for SubTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "sub".to_string(),
            description: "Subtracts the second number from the first".to_string(),
            input_schema: pair_schema(),
        }
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> ResponseEnvelope {
        let params: PairParams = match parse_args(args, ActionType::Chat) {
            Ok(p) => p,
            Err(env) => return env,
        };
        result_envelope(params.a - params.b)
    }
}

pub struct MulTool;

#[async_trait]
impl Tool for MulTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "mul".to_string(),
            description: "Multiplies two numbers together".to_string(),
            input_schema: pair_schema(),
        }
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> ResponseEnvelope {
        let params: PairParams = match parse_args(args, ActionType::Chat) {
            Ok(p) => p,
            Err(env) => return env,
        };
        result_envelope(params.a * params.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::envelope::Status;
    use std::sync::Arc;

    fn ctx() -> ToolContext {
        ToolContext {
            http: reqwest::Client::new(),
            config: Arc::new(Config::default()),
        }
    }

    #[tokio::test]
    async fn adds_numbers() {
        let env = AddTool.execute(json!({"a": 2, "b": 40}), &ctx()).await;
        assert_eq!(env.status, Status::Success);
        assert_eq!(env.message.as_deref(), Some("42"));
        assert_eq!(env.data["result"], json!(42.0));
    }

    #[tokio::test]
    async fn subtracts_and_multiplies() {
        let env = SubTool.execute(json!({"a": 10, "b": 4}), &ctx()).await;
        assert_eq!(env.message.as_deref(), Some("6"));
        let env = MulTool.execute(json!({"a": 2.5, "b": 4}), &ctx()).await;
        assert_eq!(env.message.as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn rejects_missing_operand() {
        let env = AddTool.execute(json!({"a": 2}), &ctx()).await;
        assert_eq!(env.status, Status::Error);
    }
}
