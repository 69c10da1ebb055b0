use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
///
/// Loaded from `config.toml`; anything missing falls back to defaults, so
/// an empty file (or no file at all) is a valid config with zero tokens.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Slack access tokens, one per workspace, in display order
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from the default location
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path; a missing file means defaults
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Tokens with blank entries dropped
    pub fn active_tokens(&self) -> Vec<String> {
        self.tokens
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `<config_dir>/unreadbar/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("unreadbar");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; every request gets exactly one attempt
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

fn default_base_url() -> String {
    unreadbar_api::SLACK_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("unreadbar/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// How many workspaces are polled at once. 1 polls them one after another.
    #[serde(default = "default_token_concurrency")]
    pub token_concurrency: usize,

    /// Upper bound passed to `users.conversations`
    #[serde(default = "default_conversation_limit")]
    pub conversation_limit: u32,
}

fn default_token_concurrency() -> usize {
    1
}

fn default_conversation_limit() -> u32 {
    200
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            token_concurrency: default_token_concurrency(),
            conversation_limit: default_conversation_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Program the host re-invokes for "mark as read"; defaults to ourselves
    #[serde(default)]
    pub script_path: Option<String>,

    /// Forced dark menu bar; `BitBarDarkMode` in the environment wins
    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default = "default_badge_color")]
    pub badge_color: String,

    /// Base64 PNG data for each icon variant
    #[serde(default)]
    pub icons: IconConfig,
}

fn default_badge_color() -> String {
    "#e05415".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            script_path: None,
            dark_mode: false,
            badge_color: default_badge_color(),
            icons: IconConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IconConfig {
    pub unread: Option<String>,
    pub light: Option<String>,
    pub dark: Option<String>,
}
