// src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet_agent::{
    agent::{llm::ChatModelClient, orchestrator::Orchestrator},
    api::{health::health_handler, session},
    config::Config,
    session::{InMemoryHistoryStore, SessionLocks},
    tools::{ToolContext, ToolRegistry},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return;
        }
    };

    // One HTTP client with a timeout, shared by every outbound call.
    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };

    let model = ChatModelClient::new(
        http.clone(),
        config.model_endpoint.clone(),
        config.model_name.clone(),
        config.model_api_key.clone(),
        config.model_max_tokens,
    );

    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    let tool_ctx = ToolContext {
        http: http.clone(),
        config: config.clone(),
    };
    let orchestrator = Arc::new(Orchestrator::new(Arc::new(model), registry, tool_ctx));

    let state = AppState {
        config: config.clone(),
        orchestrator,
        history: Arc::new(InMemoryHistoryStore::new()),
        session_locks: Arc::new(SessionLocks::new()),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/start", post(session::start_handler))
        .route("/query", post(session::query_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("wallet agent listening on {}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
    }
}
