//! Headless Chrome/Chromium sessions via chromiumoxide.
//!
//! Each acquired session launches its own browser process and drives the
//! Chrome DevTools Protocol event handler on a background task. Closing the
//! session shuts the browser down, reaps the process, and stops the handler.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use futures_util::StreamExt;
use parodist_core::{BrowserMode, BrowserSettings};
use tokio::task::JoinHandle;
use url::Url;

use super::{BrowserError, BrowserProvider, BrowserSession};

/// Flags for running inside containers and serverless sandboxes.
const SANDBOXED_ARGS: &[&str] = &[
    "--no-sandbox",
    "--no-zygote",
    "--single-process",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--disable-software-rasterizer",
    "--hide-scrollbars",
    "--mute-audio",
];

/// How to launch the browser, resolved once from configuration.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Explicit binary; `None` lets chromiumoxide detect a local install.
    pub executable: Option<PathBuf>,
    pub args: Vec<String>,
    pub headless: bool,
    /// Quiet period after the load event.
    pub settle: Duration,
}

impl LaunchSpec {
    /// Resolve the environment selector into concrete launch parameters.
    pub fn from_settings(settings: &BrowserSettings, settle: Duration) -> Self {
        let mut args = Vec::new();
        if settings.mode == BrowserMode::Sandboxed {
            args.extend(SANDBOXED_ARGS.iter().map(|a| a.to_string()));
        }
        args.extend(settings.args.iter().cloned());

        Self { executable: settings.executable.clone(), args, headless: settings.headless, settle }
    }

    fn browser_config(&self) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.args(self.args.iter()).build().map_err(BrowserError::Launch)
    }
}

/// Launches one headless browser per acquired session.
#[derive(Debug, Clone)]
pub struct ChromiumProvider {
    spec: LaunchSpec,
}

impl ChromiumProvider {
    pub fn new(spec: LaunchSpec) -> Self {
        Self { spec }
    }
}

#[async_trait::async_trait]
impl BrowserProvider for ChromiumProvider {
    async fn acquire(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let config = self.spec.browser_config()?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                }
            }
        });

        tracing::debug!(executable = ?self.spec.executable, "browser launched");

        Ok(Box::new(ChromiumSession { browser, handler_task, page: None, settle: self.spec.settle }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Option<Page>,
    settle: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, BrowserError> {
        self.page.as_ref().ok_or(BrowserError::NoPage)
    }
}

#[async_trait::async_trait]
impl BrowserSession for ChromiumSession {
    async fn open_page(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageSetup(e.to_string()))?;

        page.execute(SetUserAgentOverrideParams::new(user_agent.to_string()))
            .await
            .map_err(|e| BrowserError::PageSetup(e.to_string()))?;

        self.page = Some(page);
        Ok(())
    }

    async fn navigate(&mut self, url: &Url) -> Result<(), BrowserError> {
        let page = self.page()?;
        page.goto(url.as_str())
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        // late XHR and web fonts after the load event
        tokio::time::sleep(self.settle).await;
        Ok(())
    }

    async fn rendered_markup(&mut self) -> Result<String, BrowserError> {
        self.page()?
            .content()
            .await
            .map_err(|e| BrowserError::ContentRetrieval(e.to_string()))
    }

    async fn evaluate(&mut self, script: &str) -> Result<String, BrowserError> {
        self.page()?
            .evaluate(script.to_string())
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?
            .into_value::<String>()
            .map_err(|e| BrowserError::Evaluation(format!("script did not return a string: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let ChromiumSession { mut browser, handler_task, page, .. } = *self;

        if let Some(page) = page
            && let Err(e) = page.close().await
        {
            tracing::debug!("page close failed: {e}");
        }

        let result = match browser.close().await {
            Ok(_) => {
                browser.wait().await.ok();
                Ok(())
            }
            Err(e) => {
                let _ = browser.kill().await;
                Err(BrowserError::Close(e.to_string()))
            }
        };

        handler_task.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_spec_local_mode() {
        let settings = BrowserSettings { args: vec!["--lang=en-US".into()], ..Default::default() };
        let spec = LaunchSpec::from_settings(&settings, Duration::from_millis(500));
        assert!(spec.executable.is_none());
        assert_eq!(spec.args, vec!["--lang=en-US".to_string()]);
        assert!(spec.headless);
    }

    #[test]
    fn test_launch_spec_sandboxed_mode() {
        let settings = BrowserSettings {
            mode: BrowserMode::Sandboxed,
            executable: Some(PathBuf::from("/opt/chromium/chrome")),
            args: vec!["--lang=en-US".into()],
            headless: true,
        };
        let spec = LaunchSpec::from_settings(&settings, Duration::ZERO);
        assert_eq!(spec.executable, Some(PathBuf::from("/opt/chromium/chrome")));
        assert!(spec.args.iter().any(|a| a == "--no-sandbox"));
        assert_eq!(spec.args.last().map(String::as_str), Some("--lang=en-US"));
    }

    #[tokio::test]
    #[ignore = "requires Chrome/Chromium installation"]
    async fn test_chromium_session_lifecycle() {
        let provider = ChromiumProvider::new(LaunchSpec::from_settings(&BrowserSettings::default(), Duration::ZERO));
        let mut session = provider.acquire().await.unwrap();
        session.open_page("parodist-test").await.unwrap();
        let ua = session.evaluate("navigator.userAgent").await.unwrap();
        assert_eq!(ua, "parodist-test");
        session.close().await.unwrap();
    }
}
