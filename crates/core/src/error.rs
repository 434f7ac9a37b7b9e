//! Unified error types for parodist.
//!
//! Every variant carries a short stable category code (see [`Error::code`])
//! that the HTTP boundary exposes as the `error` field, alongside the detail
//! message.

/// Unified error types for the parody pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed request input (e.g., a URL that does not parse). No browser
    /// session is created for these.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Request body exceeded the configured size limit.
    #[error("PAYLOAD_TOO_LARGE: {0}")]
    PayloadTooLarge(String),

    /// Target URL resolves to a private, loopback, or reserved address.
    #[error("BLOCKED_TARGET: {0}")]
    BlockedTarget(String),

    /// A browser session could not be acquired.
    #[error("BROWSER_UNAVAILABLE: {0}")]
    BrowserUnavailable(String),

    /// Target unreachable, DNS/TLS failure, or navigation timeout.
    #[error("NAVIGATION_ERROR: {0}")]
    Navigation(String),

    /// In-page evaluation or markup capture failed.
    #[error("EXTRACTION_ERROR: {0}")]
    Extraction(String),

    /// Transport, authentication, or rate-limit failure talking to the model.
    #[error("MODEL_INVOCATION_ERROR: {0}")]
    ModelInvocation(String),

    /// The caller abandoned the request.
    #[error("CANCELLED")]
    Cancelled,

    /// The end-to-end request bound elapsed.
    #[error("TIMEOUT: gave up after {0}ms")]
    Timeout(u64),

    /// Anything not attributable to a specific stage.
    #[error("UNKNOWN_ERROR: {0}")]
    Unknown(String),
}

impl Error {
    /// Short stable category string.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Error::BlockedTarget(_) => "BLOCKED_TARGET",
            Error::BrowserUnavailable(_) => "BROWSER_UNAVAILABLE",
            Error::Navigation(_) => "NAVIGATION_ERROR",
            Error::Extraction(_) => "EXTRACTION_ERROR",
            Error::ModelInvocation(_) => "MODEL_INVOCATION_ERROR",
            Error::Cancelled => "CANCELLED",
            Error::Timeout(_) => "TIMEOUT",
            Error::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Underlying diagnostic message, without the category prefix.
    pub fn details(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::PayloadTooLarge(msg)
            | Error::BlockedTarget(msg)
            | Error::BrowserUnavailable(msg)
            | Error::Navigation(msg)
            | Error::Extraction(msg)
            | Error::ModelInvocation(msg)
            | Error::Unknown(msg) => msg.clone(),
            Error::Cancelled => "request was cancelled".to_string(),
            Error::Timeout(ms) => format!("request did not complete within {ms}ms"),
        }
    }
}
