use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub const CHAT_FAILED_MESSAGE: &str = "Chat AI call failed";
pub const INSIGHT_FAILED_MESSAGE: &str = "AI call failed";

/// Everything that can go wrong talking to the model provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP client error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed provider response: {message}")]
    MalformedResponse { message: String },

    #[error("Output does not match the insight schema: {0}")]
    SchemaMismatch(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Chat call failed: {0}")]
    ChatFailed(#[source] ProviderError),

    #[error("Insight call failed: {0}")]
    InsightFailed(#[source] ProviderError),

    #[error("Unreadable chat request: {0}")]
    InvalidChatRequest(#[source] JsonRejection),

    #[error("Unreadable insight request: {0}")]
    InvalidInsightRequest(#[source] JsonRejection),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Callers only ever see the fixed per-endpoint message; the cause is logged.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error!("{}", self);

        let message = match self {
            RelayError::ChatFailed(_) | RelayError::InvalidChatRequest(_) => CHAT_FAILED_MESSAGE,
            RelayError::InsightFailed(_) | RelayError::InvalidInsightRequest(_) => {
                INSIGHT_FAILED_MESSAGE
            }
            RelayError::ConfigError { .. } | RelayError::IoError(_) => "Internal server error",
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: message }),
        )
            .into_response()
    }
}
