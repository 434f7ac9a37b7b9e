//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PARODIST_*)
//! 2. TOML config file (if PARODIST_CONFIG_FILE set)
//! 3. Built-in defaults

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Desktop Chrome user agent presented to target pages.
pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Where the browser binary comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserMode {
    /// Auto-detect a locally installed Chrome/Chromium.
    #[default]
    Local,
    /// Explicit executable launched with container-friendly flags.
    Sandboxed,
}

/// Browser provisioning settings, resolved once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Set via PARODIST_BROWSER__MODE.
    #[serde(default)]
    pub mode: BrowserMode,

    /// Path to the browser binary. Required in sandboxed mode.
    ///
    /// Set via PARODIST_BROWSER__EXECUTABLE.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Extra command-line arguments for the browser.
    #[serde(default)]
    pub args: Vec<String>,

    /// Set via PARODIST_BROWSER__HEADLESS.
    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self { mode: BrowserMode::Local, executable: None, args: Vec::new(), headless: true }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PARODIST_*)
/// 2. TOML config file (if PARODIST_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Set via PARODIST_HOST.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Set via PARODIST_PORT.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Anthropic API key for synthesis.
    ///
    /// Set via PARODIST_ANTHROPIC_API_KEY environment variable.
    /// Required only when a parody is generated.
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// Set via PARODIST_ANTHROPIC_BASE_URL.
    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    /// Default model name, overridable per request.
    ///
    /// Set via PARODIST_MODEL.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens the model may produce.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Character budget applied to the text and markup excerpts in the prompt.
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,

    /// Largest accepted HTTP request body, in bytes. Fingerprints posted
    /// back for synthesis carry the full captured markup.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// User-Agent string presented to target pages.
    ///
    /// Set via PARODIST_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Navigation timeout in milliseconds.
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Quiet period after the load event before sampling styles.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// End-to-end bound for extract-then-synthesize, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// HTTP timeout for the model call, in milliseconds.
    #[serde(default = "default_model_timeout_ms")]
    pub model_timeout_ms: u64,

    /// Allow navigation to loopback/private addresses.
    ///
    /// Set via PARODIST_ALLOW_PRIVATE_TARGETS.
    #[serde(default)]
    pub allow_private_targets: bool,

    #[serde(default)]
    pub browser: BrowserSettings,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    3000
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".into()
}

fn default_model() -> String {
    "claude-sonnet-4-5".into()
}

fn default_max_output_tokens() -> u32 {
    10_000
}

fn default_excerpt_chars() -> usize {
    10_000
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_user_agent() -> String {
    DESKTOP_USER_AGENT.into()
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_settle_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_model_timeout_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            anthropic_api_key: None,
            anthropic_base_url: default_anthropic_base_url(),
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            excerpt_chars: default_excerpt_chars(),
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_ms: default_settle_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            model_timeout_ms: default_model_timeout_ms(),
            allow_private_targets: false,
            browser: BrowserSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_millis(self.model_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PARODIST_`
    /// 2. TOML file from `PARODIST_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment()
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PARODIST_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("PARODIST_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Return the Anthropic API key (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_anthropic_api_key(&self) -> Result<&str, ConfigError> {
        self.anthropic_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "anthropic_api_key".into(),
                hint: "Set PARODIST_ANTHROPIC_API_KEY environment variable".into(),
            })
    }
}
