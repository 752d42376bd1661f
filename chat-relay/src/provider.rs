//! Client for an OpenAI-compatible chat-completions endpoint.
//!
//! Every call is a single request: no streaming, no retries and no client
//! timeout. A hung provider hangs the calling request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RelayConfig;
use crate::error::ProviderError;

/// Structured answer returned by `/insight`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Insight {
    pub summary: String,
    pub anomalies: Vec<String>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: NamedSchema,
}

#[derive(Serialize)]
struct NamedSchema {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionResponseMessage,
}

#[derive(Deserialize)]
struct CompletionResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// System instruction for `/chat`, embedding the caller's data context verbatim.
pub fn chat_system_prompt(data_context: &str) -> String {
    format!(
        "You are a data analysis assistant. Answer questions about the user's dataset.\n\n\
         Dataset Context:\n{}\n\n\
         Provide clear, helpful answers with emojis and formatting.",
        data_context
    )
}

/// JSON schema sent with insight requests, without the `$schema` marker.
fn insight_schema() -> serde_json::Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(Insight))
        .unwrap_or_else(|_| serde_json::json!({}));
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

/// Validate provider output against the exact insight shape.
pub fn parse_insight(content: &str) -> Result<Insight, ProviderError> {
    serde_json::from_str(content.trim()).map_err(ProviderError::SchemaMismatch)
}

/// Not `Debug`: holds the API key.
#[derive(Clone)]
pub struct ModelProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ModelProvider {
    pub fn new(config: &RelayConfig) -> Self {
        info!(
            "Model provider: {} ({})",
            config.provider_base_url, config.model
        );

        Self {
            client: reqwest::Client::new(),
            base_url: config.provider_base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub async fn generate_text(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![
                CompletionMessage {
                    role: "system",
                    content: system,
                },
                CompletionMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: None,
        };

        self.complete(&request).await
    }

    pub async fn generate_insight(&self, prompt: &str) -> Result<Insight, ProviderError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![CompletionMessage {
                role: "user",
                content: prompt,
            }],
            response_format: Some(ResponseFormat {
                format_type: "json_schema",
                json_schema: NamedSchema {
                    name: "insight",
                    strict: true,
                    schema: insight_schema(),
                },
            }),
        };

        let content = self.complete(&request).await?;
        parse_insight(&content)
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} ({} messages)", url, request.messages.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::MalformedResponse {
                    message: e.to_string(),
                })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse {
                message: "No message content in response".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_embeds_context_verbatim() {
        let prompt = chat_system_prompt("\nTotal Rows: 3\n");
        assert!(prompt.starts_with("You are a data analysis assistant."));
        assert!(prompt.contains("Dataset Context:\n\nTotal Rows: 3\n\n"));
        assert!(prompt.ends_with("with emojis and formatting."));
    }

    #[test]
    fn parse_valid_insight() {
        let insight = parse_insight(r#"{"summary": "Flat.", "anomalies": []}"#).unwrap();
        assert_eq!(insight.summary, "Flat.");
        assert!(insight.anomalies.is_empty());
    }

    #[test]
    fn missing_anomalies_is_schema_mismatch() {
        let err = parse_insight(r#"{"summary": "Flat."}"#).unwrap_err();
        assert!(matches!(err, ProviderError::SchemaMismatch(_)));
    }

    #[test]
    fn extra_or_mistyped_fields_are_rejected() {
        assert!(parse_insight(r#"{"summary": "x", "anomalies": [], "score": 1}"#).is_err());
        assert!(parse_insight(r#"{"summary": "x", "anomalies": "none"}"#).is_err());
        assert!(parse_insight("not json").is_err());
    }

    #[test]
    fn insight_schema_requires_both_fields() {
        let schema = insight_schema();
        assert!(schema.get("$schema").is_none());
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "summary"));
        assert!(required.iter().any(|v| v == "anomalies"));
        assert_eq!(schema["additionalProperties"], serde_json::json!(false));
    }
}
