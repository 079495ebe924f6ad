//! Azure OpenAI chat-completions client
//!
//! Implements [`DocGenerator`] by asking a chat deployment for the XML
//! documentation comment of one declaration at a time.

use std::time::Duration;

use async_trait::async_trait;
use docweave_core::{DocGenerator, DocweaveError, GenerationError, ServiceConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const SYSTEM_PROMPT: &str = "You write C# XML documentation comments. \
Given a declaration and its fully-qualified name, reply with the documentation \
comment lines only: a <summary> element plus <typeparam>, <param> and <returns> \
elements where they apply. Do not repeat the declaration, do not add \
explanations and do not wrap the answer in a code block.";

#[derive(Debug, Clone)]
pub struct AzureOpenAiClient {
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    client: Client,
}

impl AzureOpenAiClient {
    /// Build a client from validated service settings
    pub fn from_config(service: &ServiceConfig) -> Result<Self, DocweaveError> {
        let (Some(endpoint), Some(api_key), Some(deployment)) = (
            service.endpoint.as_deref(),
            service.api_key.as_deref(),
            service.deployment.as_deref(),
        ) else {
            return Err(DocweaveError::configuration_missing(
                [
                    ("service.endpoint", service.endpoint.is_none()),
                    ("service.apiKey", service.api_key.is_none()),
                    ("service.deployment", service.deployment.is_none()),
                ]
                .into_iter()
                .filter(|(_, missing)| *missing)
                .map(|(field, _)| field),
            ));
        };

        let timeout = service.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocweaveError::config_error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            deployment: deployment.to_string(),
            api_version: service.api_version().to_string(),
            temperature: service.temperature(),
            max_tokens: service.max_tokens(),
            timeout,
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn request_body(&self, context_name: &str, code_snippet: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Declaration: {context_name}\n\n```csharp\n{code_snippet}\n```"
                    ),
                },
            ],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> GenerationError {
        if error.is_timeout() {
            GenerationError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            GenerationError::transport(error.to_string())
        }
    }
}

#[async_trait]
impl DocGenerator for AzureOpenAiClient {
    async fn generate(
        &self,
        context_name: &str,
        code_snippet: &str,
    ) -> Result<String, GenerationError> {
        debug!(name = context_name, deployment = %self.deployment, "Requesting documentation");

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.api_key)
            .json(&self.request_body(context_name, code_snippet))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::invalid_response(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        let text = strip_code_fences(&content);
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Remove a surrounding markdown code block, if any
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```xml, ```csharp) along with the opening fence
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}
