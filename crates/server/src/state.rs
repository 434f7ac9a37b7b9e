//! Shared handler state and the cancellable request runner.

use std::future::Future;
use std::time::Duration;

use parodist_client::ParodyPipeline;
use parodist_core::Error;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: ParodyPipeline,
    /// End-to-end bound for one request's pipeline work.
    pub request_timeout: Duration,
    /// Request body limit applied to every route.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: ParodyPipeline, request_timeout: Duration, max_body_bytes: usize) -> Self {
        Self { pipeline, request_timeout, max_body_bytes }
    }

    /// Run `work` on its own task under the request timeout.
    ///
    /// The token handed to `work` is cancelled when the timeout elapses and
    /// when the calling handler is dropped (client disconnect), so the task
    /// still tears its browser session down after nobody is waiting for it.
    pub async fn run_cancellable<T, F, Fut>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let _guard = token.clone().drop_guard();

        let task = tokio::spawn(work(token.clone()));

        match tokio::time::timeout(self.request_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(Error::Unknown(format!("pipeline task failed: {e}"))),
            Err(_) => {
                token.cancel();
                Err(Error::Timeout(self.request_timeout.as_millis() as u64))
            }
        }
    }
}
