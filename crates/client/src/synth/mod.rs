//! Parody synthesis from a page fingerprint.
//!
//! Builds a bounded prompt, makes one model call with a fixed output budget,
//! and strips wrapping artifacts from the answer. Nothing is retried here.

pub mod prompt;
pub mod sanitize;

pub use prompt::{DEFAULT_EXCERPT_CHARS, ParodyRequest, truncate_chars};
pub use sanitize::sanitize_html;

use std::sync::Arc;
use std::time::Instant;

use parodist_core::{AppConfig, Error, Fingerprint};
use tokio_util::sync::CancellationToken;

use crate::model::{CompletionRequest, ModelClient};

/// Synthesis settings.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub max_output_tokens: u32,
    pub excerpt_chars: usize,
}

impl SynthOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { max_output_tokens: config.max_output_tokens, excerpt_chars: config.excerpt_chars }
    }
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self { max_output_tokens: 10_000, excerpt_chars: DEFAULT_EXCERPT_CHARS }
    }
}

/// Turns a [`Fingerprint`] into standalone parody HTML.
#[derive(Clone)]
pub struct ParodySynthesizer {
    model: Arc<dyn ModelClient>,
    options: SynthOptions,
}

impl ParodySynthesizer {
    pub fn new(model: Arc<dyn ModelClient>, options: SynthOptions) -> Self {
        Self { model, options }
    }

    /// Generate sanitized parody HTML for `fingerprint`.
    ///
    /// A response without text is a successful empty string.
    ///
    /// # Errors
    ///
    /// - `ModelInvocation` for any failure of the model call, including a
    ///   missing API key.
    /// - `Cancelled` if `cancel` fires before the model answers.
    pub async fn synthesize(
        &self, fingerprint: &Fingerprint, model: Option<&str>, cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let request = ParodyRequest::from_fingerprint(fingerprint, self.options.excerpt_chars)
            .map_err(|e| Error::Unknown(format!("failed to serialize fingerprint: {e}")))?;

        let completion_request = CompletionRequest {
            model: model.map(str::to_string),
            prompt: request.prompt(),
            max_tokens: self.options.max_output_tokens,
        };

        tracing::debug!(
            prompt_chars = completion_request.prompt.chars().count(),
            text_excerpt_chars = request.text_excerpt.chars().count(),
            markup_excerpt_chars = request.markup_excerpt.chars().count(),
            "parody prompt built"
        );

        let start = Instant::now();
        let completion = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.model.complete(&completion_request) => result?,
        };

        let html = sanitize_html(completion.text.as_deref().unwrap_or_default());

        if html.is_empty() {
            tracing::warn!("model returned no usable HTML");
        }
        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, html_chars = html.len(), "parody synthesized");

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::testing::MockModel;

    fn synthesizer(model: MockModel) -> (ParodySynthesizer, Arc<MockModel>) {
        let model = Arc::new(model);
        (ParodySynthesizer::new(model.clone(), SynthOptions::default()), model)
    }

    fn fingerprint() -> Fingerprint {
        let mut fp = Fingerprint::default();
        fp.color_palette.insert("rgb(10, 20, 30)");
        fp.headings.push("Welcome");
        fp.visible_text = "x".repeat(30_000);
        fp.raw_markup = Some("<html></html>".into());
        fp
    }

    #[tokio::test]
    async fn test_fenced_response_is_sanitized() {
        let (synth, _) = synthesizer(MockModel::replying("```html\n<html>...</html>\n```"));
        let html = synth.synthesize(&fingerprint(), None, &CancellationToken::new()).await.unwrap();
        assert_eq!(html, "<html>...</html>");
    }

    #[tokio::test]
    async fn test_missing_text_payload_is_empty_success() {
        let (synth, model) = synthesizer(MockModel::default());
        let html = synth.synthesize(&fingerprint(), None, &CancellationToken::new()).await.unwrap();
        assert_eq!(html, "");
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_carries_budget_and_bounded_prompt() {
        let (synth, model) = synthesizer(MockModel::replying("<html></html>"));
        synth.synthesize(&fingerprint(), None, &CancellationToken::new()).await.unwrap();

        let request = model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.max_tokens, 10_000);
        assert_eq!(request.model, None);
        assert!(request.prompt.contains(&"x".repeat(DEFAULT_EXCERPT_CHARS)));
        assert!(!request.prompt.contains(&"x".repeat(DEFAULT_EXCERPT_CHARS + 1)));
        assert!(model.last_prompt().contains("rgb(10, 20, 30)"));
    }

    #[tokio::test]
    async fn test_model_override_forwarded() {
        let (synth, model) = synthesizer(MockModel::replying("<html></html>"));
        synth
            .synthesize(&fingerprint(), Some("claude-haiku-4-5"), &CancellationToken::new())
            .await
            .unwrap();
        let request = model.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.model.as_deref(), Some("claude-haiku-4-5"));
    }

    #[tokio::test]
    async fn test_model_failure_maps_to_model_invocation() {
        let (synth, _) = synthesizer(MockModel { error: Some("connection reset".into()), ..Default::default() });
        let err = synth.synthesize(&fingerprint(), None, &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.code(), "MODEL_INVOCATION_ERROR");
        assert!(err.details().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_cancel_during_model_call() {
        let (synth, model) = synthesizer(MockModel {
            reply: Some("<html></html>".into()),
            delay: Duration::from_secs(30),
            ..Default::default()
        });
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = synth.synthesize(&fingerprint(), None, &cancel).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fingerprint_not_mutated() {
        let (synth, _) = synthesizer(MockModel::replying("<html></html>"));
        let fp = fingerprint();
        let before = fp.clone();
        synth.synthesize(&fp, None, &CancellationToken::new()).await.unwrap();
        assert_eq!(fp, before);
    }
}
