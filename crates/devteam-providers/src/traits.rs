//! LLM Provider trait — the seam between the agents and the model backend.

use async_trait::async_trait;
use devteam_core::config::AgentDefaults;
use devteam_core::types::{ChatMessage, LlmResponse};

/// Sampling parameters passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

impl From<&AgentDefaults> for LlmRequestConfig {
    fn from(defaults: &AgentDefaults) -> Self {
        Self {
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat request.
    ///
    /// # Arguments
    /// * `messages` — Conversation, system prompt first.
    /// * `model`    — Model identifier (e.g. `"llama3"`, `"openchat:latest"`).
    /// * `config`   — Temperature, max_tokens.
    ///
    /// # Returns
    /// On API errors, returns `LlmResponse::error(...)` instead of propagating.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &str,
        config: &LlmRequestConfig,
    ) -> LlmResponse;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
