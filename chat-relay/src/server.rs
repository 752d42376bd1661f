use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::RelayConfig;
use crate::error::RelayError;
use crate::provider::{chat_system_prompt, Insight, ModelProvider};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(rename = "dataContext", default)]
    pub data_context: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub prompt: String,
}

pub struct RelayServer {
    provider: Arc<ModelProvider>,
}

impl RelayServer {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            provider: Arc::new(ModelProvider::new(config)),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/chat", post(handle_chat))
            .route("/insight", post(handle_insight))
            .route("/health", get(health_check))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.provider.clone())
    }

    pub async fn start(&self, addr: SocketAddr) -> Result<(), RelayError> {
        self.start_with_shutdown(addr, std::future::pending()).await
    }

    pub async fn start_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(&self, listener: tokio::net::TcpListener, shutdown: F) -> Result<(), RelayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("AI insight server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

async fn handle_chat(
    State(provider): State<Arc<ModelProvider>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, RelayError> {
    let Json(request) = payload.map_err(RelayError::InvalidChatRequest)?;
    info!(
        "Received chat request ({} chars of context)",
        request.data_context.len()
    );

    let system = chat_system_prompt(&request.data_context);
    let response = provider
        .generate_text(&system, &request.prompt)
        .await
        .map_err(RelayError::ChatFailed)?;

    Ok(Json(ChatResponse { response }))
}

async fn handle_insight(
    State(provider): State<Arc<ModelProvider>>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<Insight>, RelayError> {
    let Json(request) = payload.map_err(RelayError::InvalidInsightRequest)?;
    info!("Received insight request");

    let insight = provider
        .generate_insight(&request.prompt)
        .await
        .map_err(RelayError::InsightFailed)?;

    Ok(Json(insight))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
