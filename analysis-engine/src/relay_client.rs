use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::AnalysisError;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:4000";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
    #[serde(rename = "dataContext")]
    data_context: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct InsightRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Insight {
    pub summary: String,
    pub anomalies: Vec<String>,
}

/// HTTP client for the chat relay. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Using chat relay at {}", base_url);

        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub async fn chat(&self, prompt: &str, data_context: &str) -> Result<String, AnalysisError> {
        let url = format!("{}/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                prompt,
                data_context,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Relay chat call failed with status {}", status);
            return Err(AnalysisError::RelayStatus {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.response)
    }

    pub async fn insight(&self, prompt: &str) -> Result<Insight, AnalysisError> {
        let url = format!("{}/insight", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&InsightRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Relay insight call failed with status {}", status);
            return Err(AnalysisError::RelayStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new(DEFAULT_RELAY_URL)
    }
}
