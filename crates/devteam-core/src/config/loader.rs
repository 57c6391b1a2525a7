//! Config loader — reads `~/.devteam/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.devteam/config.json`
//! 3. `OLLAMA_BASE_URL` / `OLLAMA_API_KEY`
//! 4. Environment variables `DEVTEAM_<SECTION>__<FIELD>` (override everything)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `OLLAMA_BASE_URL` / `OLLAMA_API_KEY` → `provider.api_base` / `provider.api_key`
/// - `DEVTEAM_AGENTS__DEFAULTS__MODEL` → `agents.defaults.model`
/// - `DEVTEAM_AGENTS__DEFAULTS__MAX_TOKENS` → `agents.defaults.max_tokens`
/// - `DEVTEAM_AGENTS__DEFAULTS__TEMPERATURE` → `agents.defaults.temperature`
/// - `DEVTEAM_AGENTS__DEFAULTS__LANGUAGE` → `agents.defaults.language`
/// - `DEVTEAM_PROVIDER__API_BASE` / `DEVTEAM_PROVIDER__API_KEY`
/// - `DEVTEAM_SESSIONS__MAX_HISTORY`, `DEVTEAM_SESSIONS__TTL_HOURS`,
///   `DEVTEAM_SESSIONS__SNAPSHOT_PATH`, `DEVTEAM_SESSIONS__AUTOSAVE`
fn apply_env_overrides(mut config: Config) -> Config {
    // Conventional Ollama variables
    if let Ok(val) = std::env::var("OLLAMA_BASE_URL") {
        config.provider.api_base = val;
    }
    if let Ok(val) = std::env::var("OLLAMA_API_KEY") {
        config.provider.api_key = val;
    }

    // Agent defaults
    if let Ok(val) = std::env::var("DEVTEAM_AGENTS__DEFAULTS__MODEL") {
        config.agents.defaults.model = val;
    }
    if let Ok(val) = std::env::var("DEVTEAM_AGENTS__DEFAULTS__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.agents.defaults.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("DEVTEAM_AGENTS__DEFAULTS__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.agents.defaults.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("DEVTEAM_AGENTS__DEFAULTS__LANGUAGE") {
        config.agents.defaults.language = val;
    }

    // Provider
    if let Ok(val) = std::env::var("DEVTEAM_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Ok(val) = std::env::var("DEVTEAM_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }

    // Sessions
    if let Ok(val) = std::env::var("DEVTEAM_SESSIONS__MAX_HISTORY") {
        if let Ok(n) = val.parse::<usize>() {
            config.sessions.max_history = n;
        }
    }
    if let Ok(val) = std::env::var("DEVTEAM_SESSIONS__TTL_HOURS") {
        if let Ok(h) = val.parse::<f64>() {
            config.sessions.ttl_hours = h;
        }
    }
    if let Ok(val) = std::env::var("DEVTEAM_SESSIONS__SNAPSHOT_PATH") {
        config.sessions.snapshot_path = val;
    }
    if let Ok(val) = std::env::var("DEVTEAM_SESSIONS__AUTOSAVE") {
        config.sessions.autosave = val == "true" || val == "1";
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
