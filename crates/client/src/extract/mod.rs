//! Page fingerprint extraction.
//!
//! ### Lifecycle
//! - The target is canonicalized and gated before any session exists, so a
//!   malformed or private URL never costs a browser launch.
//! - The session is exclusively owned by one `extract` call and closed on
//!   every exit path: success, stage failure, timeout, and cancellation.
//! - A failed close is logged and dropped; it never replaces the error that
//!   ended the extraction.
//!
//! ### Sampling
//! - Style samples for body, h1, h2, a, button.
//! - Palettes from a fixed tag set (see [`script::SAMPLED_TAGS`]), capped at
//!   collection time.

pub mod script;

pub use script::{EXTRACTION_SCRIPT, PagePayload, SAMPLED_TAGS};

use std::sync::Arc;
use std::time::Duration;

use parodist_core::{AppConfig, Error, Fingerprint};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::browser::{BrowserProvider, BrowserSession};
use crate::target::resolve_target;

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub allow_private_targets: bool,
}

impl ExtractOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            navigation_timeout: config.navigation_timeout(),
            allow_private_targets: config.allow_private_targets,
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Drives a browser session to produce a [`Fingerprint`].
#[derive(Clone)]
pub struct PageFingerprintExtractor {
    provider: Arc<dyn BrowserProvider>,
    options: ExtractOptions,
}

impl PageFingerprintExtractor {
    pub fn new(provider: Arc<dyn BrowserProvider>, options: ExtractOptions) -> Self {
        Self { provider, options }
    }

    /// Render `url` and sample its computed presentation state.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed URL, `BlockedTarget` for a private
    ///   one; neither acquires a session.
    /// - `BrowserUnavailable` if no session could be created.
    /// - `Navigation` on navigation failure or timeout.
    /// - `Extraction` if the in-page pass or markup capture fails.
    /// - `Cancelled` if `cancel` fires first.
    pub async fn extract(
        &self, url: &str, capture_markup: bool, cancel: &CancellationToken,
    ) -> Result<Fingerprint, Error> {
        let target = resolve_target(url, self.options.allow_private_targets).await?;

        let mut session = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            acquired = self.provider.acquire() => acquired.map_err(|e| Error::BrowserUnavailable(e.to_string()))?,
        };

        tracing::debug!(url = %target, capture_markup, "browser session acquired");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = self.sample(session.as_mut(), &target, capture_markup) => result,
        };

        if let Err(e) = session.close().await {
            tracing::warn!(url = %target, error = %e, "failed to close browser session");
        }

        match &outcome {
            Ok(fingerprint) => tracing::debug!(
                url = %target,
                colors = fingerprint.color_palette.len(),
                fonts = fingerprint.font_palette.len(),
                headings = fingerprint.headings.len(),
                text_chars = fingerprint.visible_text.len(),
                "fingerprint extracted"
            ),
            Err(e) => tracing::debug!(url = %target, error = %e, "extraction failed"),
        }

        outcome
    }

    async fn sample(
        &self, session: &mut dyn BrowserSession, url: &Url, capture_markup: bool,
    ) -> Result<Fingerprint, Error> {
        session
            .open_page(&self.options.user_agent)
            .await
            .map_err(|e| Error::BrowserUnavailable(e.to_string()))?;

        match tokio::time::timeout(self.options.navigation_timeout, session.navigate(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::Navigation(e.to_string())),
            Err(_) => {
                return Err(Error::Navigation(format!(
                    "timed out after {}ms loading {url}",
                    self.options.navigation_timeout.as_millis()
                )));
            }
        }

        let raw_markup = if capture_markup {
            Some(session.rendered_markup().await.map_err(|e| Error::Extraction(e.to_string()))?)
        } else {
            None
        };

        let json = session
            .evaluate(&EXTRACTION_SCRIPT)
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let payload =
            PagePayload::decode(&json).map_err(|e| Error::Extraction(format!("unexpected page payload: {e}")))?;

        Ok(payload.into_fingerprint(raw_markup))
    }
}
