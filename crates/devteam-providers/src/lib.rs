//! LLM provider layer for devteam.
//!
//! - [`traits::LlmProvider`] — trait the agents call through
//! - [`ollama::OllamaProvider`] — HTTP client for Ollama's `/api/chat`

pub mod ollama;
pub mod traits;

pub use ollama::OllamaProvider;
pub use traits::{LlmProvider, LlmRequestConfig};
