//! Model client error types.

/// Errors from a generative model client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    /// No API key configured.
    #[error("missing API key: set PARODIST_ANTHROPIC_API_KEY")]
    MissingApiKey,

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the provider.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP response.
    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ModelError::Timeout } else { ModelError::Network(err.to_string()) }
    }
}

impl From<ModelError> for parodist_core::Error {
    fn from(err: ModelError) -> Self {
        parodist_core::Error::ModelInvocation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(ModelError::MissingApiKey.to_string().contains("API key"));

        let err = ModelError::HttpError { status: 529, message: "overloaded".into() };
        assert_eq!(err.to_string(), "HTTP error 529: overloaded");
    }

    #[test]
    fn test_into_core_error() {
        let err: parodist_core::Error = ModelError::RateLimited.into();
        assert_eq!(err.code(), "MODEL_INVOCATION_ERROR");
        assert!(err.details().contains("rate limited"));
    }
}
