//! Browser session abstraction.
//!
//! The extractor only needs a handful of capabilities from a browser: get a
//! session, open a page, navigate, evaluate a script in the page, read the
//! rendered markup, and close. How the binary is found and launched belongs
//! to the [`BrowserProvider`] implementation.

#[cfg(feature = "chromium")]
pub mod chromium;

use thiserror::Error;
use url::Url;

/// Errors that can occur while driving a browser session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch or connect to browser.
    #[error("browser launch failed: {0}")]
    Launch(String),

    /// Failed to open a page or configure it.
    #[error("page setup failed: {0}")]
    PageSetup(String),

    /// Failed to navigate to URL.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// In-page script threw or returned an unusable value.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Failed to read the rendered document.
    #[error("content retrieval failed: {0}")]
    ContentRetrieval(String),

    /// An operation was attempted before a page was opened.
    #[error("no page open in session")]
    NoPage,

    /// Shutting the browser down failed.
    #[error("browser close failed: {0}")]
    Close(String),
}

/// Supplies exclusively-owned browser sessions, one per request.
#[async_trait::async_trait]
pub trait BrowserProvider: Send + Sync {
    /// Acquire a fresh session. The caller owns it and must [`close`] it.
    ///
    /// [`close`]: BrowserSession::close
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// A live browser session.
#[async_trait::async_trait]
pub trait BrowserSession: Send {
    /// Open a blank page that presents `user_agent`.
    async fn open_page(&mut self, user_agent: &str) -> Result<(), BrowserError>;

    /// Navigate the open page and wait for it to settle.
    ///
    /// Implementations do not bound the wait themselves; callers apply the
    /// navigation timeout.
    async fn navigate(&mut self, url: &Url) -> Result<(), BrowserError>;

    /// Fully rendered document markup.
    async fn rendered_markup(&mut self) -> Result<String, BrowserError>;

    /// Evaluate `script` in the page and return its string result.
    async fn evaluate(&mut self, script: &str) -> Result<String, BrowserError>;

    /// Shut the session down.
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}
