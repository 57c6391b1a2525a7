//! Chat types shared by the provider and agent crates.
//!
//! Messages sent to the model are plain `{role, content}` pairs, the format
//! Ollama's `/api/chat` endpoint accepts.

use serde::{Deserialize, Serialize};

use crate::session::HistoryMessage;

/// Role tag for system prompts.
pub const ROLE_SYSTEM: &str = "system";
/// Role tag for user input.
pub const ROLE_USER: &str = "user";
/// Role tag for model replies.
pub const ROLE_ASSISTANT: &str = "assistant";

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message as sent to the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        ChatMessage {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ROLE_USER, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ROLE_ASSISTANT, content)
    }

    pub fn is_user(&self) -> bool {
        self.role == ROLE_USER
    }
}

impl From<&HistoryMessage> for ChatMessage {
    fn from(msg: &HistoryMessage) -> Self {
        ChatMessage::new(msg.role.clone(), msg.content.clone())
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// Response from an LLM provider after a chat call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Reply text (None if the model returned no content).
    pub content: Option<String>,
    /// Why the model stopped generating.
    pub done_reason: Option<String>,
    /// Tokens in the prompt, when reported.
    pub prompt_tokens: Option<u32>,
    /// Tokens generated, when reported.
    pub completion_tokens: Option<u32>,
    /// Whether `content` carries an error description instead of a reply.
    pub is_error: bool,
}

impl LlmResponse {
    /// Create an error response (error message as content).
    pub fn error(msg: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(msg.into()),
            is_error: true,
            ..Default::default()
        }
    }

    /// Create a plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

// ─────────────────────────────────────────────
// Ollama wire format
// ─────────────────────────────────────────────

/// Request body for Ollama's `/api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    pub options: ChatOptions,
}

/// Sampling options nested in a [`ChatRequest`].
#[derive(Debug, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub num_predict: u32,
}

/// Non-streaming response body from `/api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// The assistant message within a [`ChatResponse`].
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<ChatResponse> for LlmResponse {
    fn from(resp: ChatResponse) -> Self {
        LlmResponse {
            content: resp.message.and_then(|m| m.content),
            done_reason: resp.done_reason,
            prompt_tokens: resp.prompt_eval_count,
            completion_tokens: resp.eval_count,
            is_error: false,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
        assert!(ChatMessage::user("u").is_user());
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(ChatMessage::user("Hello")).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_from_history_message() {
        let history = HistoryMessage::new("assistant", "Hi!");
        let msg = ChatMessage::from(&history);
        assert_eq!(msg, ChatMessage::assistant("Hi!"));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "llama3".into(),
            messages: vec![ChatMessage::user("hi")],
            stream: false,
            options: ChatOptions {
                temperature: 0.7,
                num_predict: 1000,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 1000);
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_response_conversion() {
        let raw = json!({
            "model": "llama3",
            "message": {"role": "assistant", "content": "Hallo!"},
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 12,
            "eval_count": 4
        });
        let resp: LlmResponse = serde_json::from_value::<ChatResponse>(raw).unwrap().into();
        assert_eq!(resp.content.as_deref(), Some("Hallo!"));
        assert_eq!(resp.done_reason.as_deref(), Some("stop"));
        assert_eq!(resp.prompt_tokens, Some(12));
        assert_eq!(resp.completion_tokens, Some(4));
        assert!(!resp.is_error);
    }

    #[test]
    fn test_response_without_message() {
        let resp: LlmResponse = serde_json::from_value::<ChatResponse>(json!({"done": true}))
            .unwrap()
            .into();
        assert!(resp.content.is_none());
    }

    #[test]
    fn test_error_response() {
        let resp = LlmResponse::error("boom");
        assert!(resp.is_error);
        assert_eq!(resp.content.as_deref(), Some("boom"));
    }
}
