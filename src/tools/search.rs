// src/tools/search.rs

use crate::envelope::{ActionType, ResponseEnvelope};
use crate::error::AgentError;
use crate::tools::schema::{PropertySchema, ToolDefinition, ToolInputSchema};
use crate::tools::{error_envelope, parse_args, Tool, ToolContext};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};

const SERPAPI_BASE: &str = "https://serpapi.com";

/// Query SerpAPI and pick the best short answer: answer box first, then
/// the top organic snippet, then its title.
pub async fn search_snippet(
    http: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<String, AgentError> {
    let url = format!("{}/search.json", base_url.trim_end_matches('/'));
    let resp = http
        .get(&url)
        .query(&[
            ("engine", "google"),
            ("q", query),
            ("num", "1"),
            ("api_key", api_key),
        ])
        .send()
        .await
        .map_err(|e| AgentError::upstream("Web search failed", e))?;
    let body: Value = resp
        .json()
        .await
        .map_err(|e| AgentError::upstream("Web search response was not JSON", e))?;

    if let Some(answer) = body["answer_box"]["answer"].as_str() {
        return Ok(answer.to_string());
    }
    if let Some(first) = body["organic_results"].as_array().and_then(|r| r.first()) {
        if let Some(snippet) = first["snippet"].as_str() {
            return Ok(snippet.to_string());
        }
        if let Some(title) = first["title"].as_str() {
            return Ok(title.to_string());
        }
    }
    Err(AgentError::Upstream(
        "No relevant web result found.".to_string(),
    ))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "web_search".to_string(),
            description: "Search the web and return the top result snippet or answer".to_string(),
            input_schema: ToolInputSchema::new()
                .property("query", PropertySchema::string("Search query"))
                .required("query"),
        }
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> ResponseEnvelope {
        let params: SearchParams = match parse_args(args, ActionType::WebSearchResult) {
            Ok(p) => p,
            Err(env) => return env,
        };
        let Some(api_key) = ctx.config.serpapi_api_key.as_ref() else {
            return error_envelope(
                ActionType::WebSearchResult,
                AgentError::CredentialMissing(
                    "SerpAPI key not set. Please set SERPAPI_API_KEY in your environment."
                        .to_string(),
                ),
            );
        };
        match search_snippet(
            &ctx.http,
            SERPAPI_BASE,
            api_key.expose_secret(),
            &params.query,
        )
        .await
        {
            Ok(snippet) => {
                let mut data = serde_json::Map::new();
                data.insert("result".to_string(), json!(snippet));
                ResponseEnvelope::success(ActionType::WebSearchResult, data).with_message(snippet)
            }
            Err(e) => error_envelope(ActionType::WebSearchResult, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::envelope::Status;
    use std::sync::Arc;

    #[tokio::test]
    async fn missing_credential_is_an_error_envelope() {
        let ctx = ToolContext {
            http: reqwest::Client::new(),
            config: Arc::new(Config::default()),
        };
        let env = WebSearchTool
            .execute(json!({"query": "rust language"}), &ctx)
            .await;
        assert_eq!(env.action_type, ActionType::WebSearchResult);
        assert_eq!(env.status, Status::Error);
        assert!(env.error.as_deref().unwrap().contains("SERPAPI_API_KEY"));
    }
}
