//! HTTP client for Ollama's `/api/chat` endpoint.
//!
//! Requests are non-streaming: the whole reply arrives in one JSON body.

use async_trait::async_trait;
use tracing::{debug, error};

use devteam_core::config::ProviderConfig;
use devteam_core::types::{ChatMessage, ChatOptions, ChatRequest, ChatResponse, LlmResponse};

use crate::traits::{LlmProvider, LlmRequestConfig};

// ─────────────────────────────────────────────
// OllamaProvider
// ─────────────────────────────────────────────

/// LLM provider backed by an Ollama (or Ollama-compatible) server.
pub struct OllamaProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"http://localhost:11434"`).
    api_base: String,
    /// Optional bearer token; empty means no `Authorization` header.
    api_key: String,
    /// Default model for this provider instance.
    default_model: String,
}

impl std::fmt::Debug for OllamaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaProvider")
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

impl OllamaProvider {
    /// Create a provider from the `provider` config section.
    pub fn new(config: &ProviderConfig, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        OllamaProvider {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
        }
    }

    /// Build the full chat URL.
    fn chat_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/api/chat", base)
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        config: &LlmRequestConfig,
    ) -> LlmResponse {
        debug!(model = %model, messages = messages.len(), "Calling LLM");

        let request_body = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            stream: false,
            options: ChatOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
            },
        };

        let mut request = self.client.post(self.chat_url()).json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "HTTP request failed");
                return LlmResponse::error(format!("Error calling LLM: {}", e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %error_text, "API error");
            return LlmResponse::error(format!("Error calling LLM: {}: {}", status, error_text));
        }

        match response.json::<ChatResponse>().await {
            Ok(chat_resp) => {
                let llm_resp: LlmResponse = chat_resp.into();
                debug!(
                    has_content = llm_resp.content.is_some(),
                    done_reason = llm_resp.done_reason.as_deref().unwrap_or("?"),
                    "LLM response received"
                );
                llm_resp
            }
            Err(e) => {
                error!(error = %e, "Failed to parse LLM response");
                LlmResponse::error(format!("Error parsing LLM response: {}", e))
            }
        }
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        "Ollama"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
