//! Generative text model clients.
//!
//! The synthesizer is agnostic to which provider answers: it hands over a
//! prompt and an output budget and gets back an optional text payload.

pub mod anthropic;
pub mod error;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use error::ModelError;

/// A single-prompt completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Model override; `None` uses the client's default.
    pub model: Option<String>,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Text returned by the model, `None` when the response had no text payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: Option<String>,
}

/// Client for a generative text model.
#[async_trait::async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ModelError>;
}
