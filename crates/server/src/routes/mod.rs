//! HTTP routes.
//!
//! - `POST /api/scrape`: fingerprint a URL
//! - `POST /api/generate-parody`: synthesize HTML from a fingerprint
//! - `POST /api/parody`: both stages in one call
//! - `GET /health`

pub mod generate;
pub mod health;
pub mod parody;
pub mod scrape;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/api/scrape", post(scrape::scrape))
        .route("/api/generate-parody", post(generate::generate_parody))
        .route("/api/parody", post(parody::parody))
        .route("/health", get(health::health))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parodist_client::testing::{MockBehavior, MockModel, MockProvider};
    use parodist_client::{ExtractOptions, PageFingerprintExtractor, ParodyPipeline, ParodySynthesizer, SynthOptions};
    use parodist_core::AppConfig;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::AppState;

    pub struct Harness {
        pub router: Router,
        pub provider: Arc<MockProvider>,
        pub model: Arc<MockModel>,
    }

    pub fn harness(behavior: MockBehavior, model: MockModel, request_timeout: Duration) -> Harness {
        harness_with_body_limit(behavior, model, request_timeout, AppConfig::default().max_body_bytes)
    }

    pub fn harness_with_body_limit(
        behavior: MockBehavior, model: MockModel, request_timeout: Duration, max_body_bytes: usize,
    ) -> Harness {
        let provider = Arc::new(MockProvider::new(behavior));
        let model = Arc::new(model);
        let options = ExtractOptions {
            navigation_timeout: Duration::from_secs(5),
            allow_private_targets: true,
            ..Default::default()
        };
        let pipeline = ParodyPipeline::new(
            PageFingerprintExtractor::new(provider.clone(), options),
            ParodySynthesizer::new(model.clone(), SynthOptions::default()),
        );
        let router = super::router(AppState::new(pipeline, request_timeout, max_body_bytes));
        Harness { router, provider, model }
    }

    pub fn default_harness() -> Harness {
        harness(MockBehavior::default(), MockModel::replying("```html\n<html>parody</html>\n```"), Duration::from_secs(5))
    }

    pub async fn post_json(router: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }

    pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}
