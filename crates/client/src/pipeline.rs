//! Extract-then-synthesize in one call.

use std::sync::Arc;

use parodist_core::{AppConfig, Error, Fingerprint};
use tokio_util::sync::CancellationToken;

use crate::extract::{ExtractOptions, PageFingerprintExtractor};
use crate::model::{AnthropicClient, AnthropicConfig};
use crate::synth::{ParodySynthesizer, SynthOptions};

/// Both pipeline stages, wired from one configuration.
#[derive(Clone)]
pub struct ParodyPipeline {
    pub extractor: PageFingerprintExtractor,
    pub synthesizer: ParodySynthesizer,
}

impl ParodyPipeline {
    pub fn new(extractor: PageFingerprintExtractor, synthesizer: ParodySynthesizer) -> Self {
        Self { extractor, synthesizer }
    }

    /// Wire the Chromium browser provider and the Anthropic model client.
    ///
    /// Nothing is launched or contacted here; a missing API key surfaces on
    /// the first synthesis.
    #[cfg(feature = "chromium")]
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        use crate::browser::chromium::{ChromiumProvider, LaunchSpec};

        let provider = ChromiumProvider::new(LaunchSpec::from_settings(&config.browser, config.settle()));
        let model = AnthropicClient::new(AnthropicConfig::from_app_config(config))
            .map_err(|e| Error::Unknown(format!("failed to build model client: {e}")))?;

        Ok(Self::new(
            PageFingerprintExtractor::new(Arc::new(provider), ExtractOptions::from_config(config)),
            ParodySynthesizer::new(Arc::new(model), SynthOptions::from_config(config)),
        ))
    }

    /// Fingerprint `url` with full markup and synthesize its parody.
    pub async fn run(&self, url: &str, model: Option<&str>, cancel: &CancellationToken) -> Result<String, Error> {
        let fingerprint = self.fingerprint(url, true, cancel).await?;
        self.synthesizer.synthesize(&fingerprint, model, cancel).await
    }

    pub async fn fingerprint(
        &self, url: &str, capture_markup: bool, cancel: &CancellationToken,
    ) -> Result<Fingerprint, Error> {
        self.extractor.extract(url, capture_markup, cancel).await
    }
}
