//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.callrelay/config.json`) and environment.
//! Credentials for the intent service may come from either; env wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Intent detection service (Dialogflow) settings.
    #[serde(default)]
    pub intent: IntentConfig,
}

/// Bind address and port for the webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 8000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

/// Dialogflow ES settings. The session is not configured here: it is derived per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentConfig {
    /// Google Cloud project that owns the agent. Overridden by DIALOGFLOW_PROJECT_ID env.
    pub project_id: Option<String>,

    /// OAuth bearer token for the Dialogflow API. Overridden by DIALOGFLOW_ACCESS_TOKEN env.
    /// When neither is set requests go out without an Authorization header (emulators, tests).
    pub access_token: Option<String>,

    /// API root (default "https://dialogflow.googleapis.com").
    pub base_url: Option<String>,

    /// Language of the transcribed speech (default "en-US").
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Deadline for one detectIntent round trip in milliseconds (default 10000).
    #[serde(default = "default_intent_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_intent_timeout_ms() -> u64 {
    10_000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            access_token: None,
            base_url: None,
            language_code: default_language_code(),
            timeout_ms: default_intent_timeout_ms(),
        }
    }
}

impl IntentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Reject values that would make every call fail.
    pub fn validate(&self) -> Result<()> {
        if self.intent.timeout_ms == 0 {
            anyhow::bail!("intent.timeoutMs must be greater than 0");
        }
        Ok(())
    }
}

/// Non-empty trimmed value of an env var.
fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the Dialogflow project id: env DIALOGFLOW_PROJECT_ID overrides config.
pub fn resolve_intent_project(config: &Config) -> Option<String> {
    env_non_empty("DIALOGFLOW_PROJECT_ID").or_else(|| non_empty(config.intent.project_id.as_ref()))
}

/// Resolve the Dialogflow bearer token: env DIALOGFLOW_ACCESS_TOKEN overrides config.
pub fn resolve_intent_token(config: &Config) -> Option<String> {
    env_non_empty("DIALOGFLOW_ACCESS_TOKEN")
        .or_else(|| non_empty(config.intent.access_token.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CALLRELAY_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".callrelay").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, else the default path (or CALLRELAY_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config
        .validate()
        .with_context(|| format!("invalid config in {}", path.display()))?;
    Ok((config, path))
}

/// Serializes tests that read or write process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
