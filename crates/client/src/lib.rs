//! Client code for parodist.
//!
//! This crate provides the fingerprint extraction and parody synthesis
//! pipeline shared by the server and CLI: target gating, browser sessions,
//! in-page sampling, the model client, prompt construction, and output
//! sanitization.

pub mod browser;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod synth;
pub mod target;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use browser::{BrowserError, BrowserProvider, BrowserSession};
pub use extract::{ExtractOptions, PageFingerprintExtractor};
pub use model::{AnthropicClient, AnthropicConfig, Completion, CompletionRequest, ModelClient, ModelError};
pub use pipeline::ParodyPipeline;
pub use synth::{ParodyRequest, ParodySynthesizer, SynthOptions, sanitize_html};
pub use target::{canonicalize, resolve_target};

#[cfg(feature = "chromium")]
pub use browser::chromium::{ChromiumProvider, LaunchSpec};
