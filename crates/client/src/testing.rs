//! In-process stand-ins for the browser and the model, shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use url::Url;

use crate::browser::{BrowserError, BrowserProvider, BrowserSession};
use crate::model::{Completion, CompletionRequest, ModelClient, ModelError};

/// Payload the extraction script would return for a small synthetic page:
/// a `rgb(10, 20, 30)` body, one `<h1>Welcome</h1>`, one link, and a
/// description meta tag.
pub const SYNTHETIC_PAGE_PAYLOAD: &str = r#"{
  "title": "Demo",
  "description": "demo",
  "styleSamples": {
    "body": {"backgroundColor": "rgb(10, 20, 30)", "textColor": "rgb(0, 0, 0)", "fontFamily": "Times",
             "fontSize": "16px", "fontWeight": "400", "padding": "0px", "margin": "8px"},
    "primaryHeading": {"backgroundColor": "rgba(0, 0, 0, 0)", "textColor": "rgb(0, 0, 0)", "fontFamily": "Times",
                       "fontSize": "32px", "fontWeight": "700", "padding": "0px", "margin": "21.44px 0px"},
    "secondaryHeading": null,
    "link": {"backgroundColor": "rgba(0, 0, 0, 0)", "textColor": "rgb(0, 0, 238)", "fontFamily": "Times",
             "fontSize": "16px", "fontWeight": "400", "padding": "0px", "margin": "0px"},
    "button": null
  },
  "colors": ["rgb(10, 20, 30)", "rgb(0, 0, 0)", "rgb(0, 0, 238)"],
  "fonts": ["Times"],
  "headings": ["Welcome"],
  "visibleText": "Welcome\nClick"
}"#;

pub const SYNTHETIC_PAGE_MARKUP: &str = concat!(
    r#"<html><head><meta name="description" content="demo"><title>Demo</title></head>"#,
    r#"<body style="background-color: rgb(10,20,30)"><h1>Welcome</h1><a href="/">Click</a></body></html>"#,
);

/// Scripted behavior of a [`MockSession`].
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub acquire_error: Option<String>,
    pub navigate_delay: Duration,
    pub navigate_error: Option<String>,
    pub evaluate_result: Result<String, String>,
    pub markup: String,
    pub close_error: Option<String>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            acquire_error: None,
            navigate_delay: Duration::ZERO,
            navigate_error: None,
            evaluate_result: Ok(SYNTHETIC_PAGE_PAYLOAD.to_string()),
            markup: SYNTHETIC_PAGE_MARKUP.to_string(),
            close_error: None,
        }
    }
}

/// Counts every lifecycle call so tests can assert on leaks and double-closes.
#[derive(Debug, Default)]
pub struct Counters {
    pub acquired: AtomicUsize,
    pub navigated: AtomicUsize,
    pub markup_reads: AtomicUsize,
    pub closed: AtomicUsize,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn navigated(&self) -> usize {
        self.navigated.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn markup_reads(&self) -> usize {
        self.markup_reads.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
pub struct MockProvider {
    pub behavior: MockBehavior,
    pub counters: Arc<Counters>,
}

impl MockProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self { behavior, counters: Arc::default() }
    }
}

#[async_trait::async_trait]
impl BrowserProvider for MockProvider {
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if let Some(msg) = &self.behavior.acquire_error {
            return Err(BrowserError::Launch(msg.clone()));
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession { behavior: self.behavior.clone(), counters: self.counters.clone(), page_open: false }))
    }
}

pub struct MockSession {
    behavior: MockBehavior,
    counters: Arc<Counters>,
    page_open: bool,
}

#[async_trait::async_trait]
impl BrowserSession for MockSession {
    async fn open_page(&mut self, _user_agent: &str) -> Result<(), BrowserError> {
        self.page_open = true;
        Ok(())
    }

    async fn navigate(&mut self, _url: &Url) -> Result<(), BrowserError> {
        if !self.page_open {
            return Err(BrowserError::NoPage);
        }
        self.counters.navigated.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.behavior.navigate_delay).await;
        match &self.behavior.navigate_error {
            Some(msg) => Err(BrowserError::Navigation(msg.clone())),
            None => Ok(()),
        }
    }

    async fn rendered_markup(&mut self) -> Result<String, BrowserError> {
        self.counters.markup_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.behavior.markup.clone())
    }

    async fn evaluate(&mut self, _script: &str) -> Result<String, BrowserError> {
        self.behavior.evaluate_result.clone().map_err(BrowserError::Evaluation)
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        match &self.behavior.close_error {
            Some(msg) => Err(BrowserError::Close(msg.clone())),
            None => Ok(()),
        }
    }
}

/// Model stand-in that records the last request and replays a fixed answer.
#[derive(Debug, Default)]
pub struct MockModel {
    pub reply: Option<String>,
    pub error: Option<String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
    pub last_request: std::sync::Mutex<Option<CompletionRequest>>,
}

impl MockModel {
    pub fn replying(text: &str) -> Self {
        Self { reply: Some(text.to_string()), ..Default::default() }
    }

    pub fn last_prompt(&self) -> String {
        self.last_request
            .lock()
            .unwrap()
            .as_ref()
            .map(|r| r.prompt.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ModelClient for MockModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        tokio::time::sleep(self.delay).await;
        if let Some(msg) = &self.error {
            return Err(ModelError::Network(msg.clone()));
        }
        Ok(Completion { text: self.reply.clone() })
    }
}
