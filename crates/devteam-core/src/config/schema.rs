//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentsConfig`, `ProviderConfig`, `SessionsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.devteam/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agents: AgentsConfig,
    pub provider: ProviderConfig,
    pub sessions: SessionsConfig,
}

// ─────────────────────────────────────────────
// Agents
// ─────────────────────────────────────────────

/// Agent configuration container.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

/// Settings shared by every team agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentDefaults {
    /// Ollama model name.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// How many recent session messages accompany each LLM call.
    pub history_window: usize,
    /// Language the agents answer in unless the user asks otherwise.
    pub language: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: "llama3".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            history_window: 10,
            language: "Dutch".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the Ollama-compatible backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// Base URL of the API (without the `/api/chat` suffix).
    pub api_base: String,
    /// Optional bearer token.
    pub api_key: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Whether an API key is set.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:11434".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Session retention and persistence settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Messages retained per session.
    pub max_history: usize,
    /// Idle hours before a session expires.
    pub ttl_hours: f64,
    /// Snapshot file (`~` is expanded).
    pub snapshot_path: String,
    /// Save the snapshot when the CLI exits.
    pub autosave: bool,
}

impl SessionsConfig {
    /// Retention options for new sessions.
    pub fn options(&self) -> SessionOptions {
        SessionOptions::new(self.max_history, self.ttl_hours)
    }

    /// Snapshot path with `~` expanded.
    pub fn resolved_snapshot_path(&self) -> std::path::PathBuf {
        crate::utils::expand_home(&self.snapshot_path)
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_history: 20,
            ttl_hours: 24.0,
            snapshot_path: "~/.devteam/sessions.json".to_string(),
            autosave: true,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
