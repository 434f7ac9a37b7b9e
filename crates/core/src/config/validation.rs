//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, BrowserMode};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 300_000;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < MIN_TIMEOUT_MS {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > MAX_TIMEOUT_MS {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any timeout is below 100ms or above 5 minutes
    /// - `request_timeout_ms` is shorter than `navigation_timeout_ms`
    /// - `excerpt_chars`, `max_output_tokens`, or `max_body_bytes` is 0
    /// - `user_agent` or `model` is empty
    ///
    /// Returns `ConfigError::Missing` if sandboxed browser mode has no executable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("navigation_timeout_ms", self.navigation_timeout_ms)?;
        check_timeout("request_timeout_ms", self.request_timeout_ms)?;
        check_timeout("model_timeout_ms", self.model_timeout_ms)?;

        if self.request_timeout_ms < self.navigation_timeout_ms {
            return Err(invalid("request_timeout_ms", "must not be shorter than navigation_timeout_ms"));
        }

        if self.settle_ms > self.navigation_timeout_ms {
            return Err(invalid("settle_ms", "must not exceed navigation_timeout_ms"));
        }

        if self.excerpt_chars == 0 {
            return Err(invalid("excerpt_chars", "must be greater than 0"));
        }

        if self.max_output_tokens == 0 {
            return Err(invalid("max_output_tokens", "must be greater than 0"));
        }

        if self.max_body_bytes == 0 {
            return Err(invalid("max_body_bytes", "must be greater than 0"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.model.is_empty() {
            return Err(invalid("model", "must not be empty"));
        }

        if self.browser.mode == BrowserMode::Sandboxed && self.browser.executable.is_none() {
            return Err(ConfigError::Missing {
                field: "browser.executable".into(),
                hint: "Set PARODIST_BROWSER__EXECUTABLE when PARODIST_BROWSER__MODE=sandboxed".into(),
            });
        }

        if self.allow_private_targets {
            tracing::warn!("allow_private_targets is set; loopback and private addresses are reachable");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserSettings;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { navigation_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "navigation_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { model_timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "model_timeout_ms"));
    }

    #[test]
    fn test_validate_request_shorter_than_navigation() {
        let config = AppConfig { navigation_timeout_ms: 30_000, request_timeout_ms: 10_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "request_timeout_ms"));
    }

    #[test]
    fn test_validate_zero_budgets() {
        let config = AppConfig { max_output_tokens: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_output_tokens"));

        let config = AppConfig { excerpt_chars: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "excerpt_chars"));

        let config = AppConfig { max_body_bytes: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_body_bytes"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_sandboxed_requires_executable() {
        let browser = BrowserSettings { mode: BrowserMode::Sandboxed, ..Default::default() };
        let config = AppConfig { browser, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "browser.executable"));

        let browser = BrowserSettings {
            mode: BrowserMode::Sandboxed,
            executable: Some(PathBuf::from("/opt/chromium/chrome")),
            ..Default::default()
        };
        let config = AppConfig { browser, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            navigation_timeout_ms: 100,
            request_timeout_ms: 100,
            settle_ms: 0,
            excerpt_chars: 1,
            max_output_tokens: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
