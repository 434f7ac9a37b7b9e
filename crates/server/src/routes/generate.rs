//! `POST /api/generate-parody`: synthesize parody HTML from a fingerprint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use parodist_core::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateParams {
    pub style_data: Fingerprint,
    /// Model override for this request.
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    pub html: String,
}

pub async fn generate_parody(
    State(state): State<AppState>, payload: Result<Json<GenerateParams>, JsonRejection>,
) -> Result<Json<GenerateOutput>, ApiError> {
    let Json(params) = payload?;
    tracing::info!(title = %params.style_data.metadata.title, "parody generation requested");

    let synthesizer = state.pipeline.synthesizer.clone();
    let html = state
        .run_cancellable(move |cancel| async move {
            synthesizer.synthesize(&params.style_data, params.model.as_deref(), &cancel).await
        })
        .await?;

    Ok(Json(GenerateOutput { success: true, html }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use parodist_client::testing::{MockBehavior, MockModel, SYNTHETIC_PAGE_PAYLOAD};

    use crate::routes::test_support::*;

    fn style_data_body() -> String {
        let style_data = parodist_client::extract::PagePayload::decode(SYNTHETIC_PAGE_PAYLOAD)
            .unwrap()
            .into_fingerprint(Some("<html><h1>Welcome</h1></html>".into()));
        serde_json::json!({ "styleData": style_data }).to_string()
    }

    #[tokio::test]
    async fn test_generate_returns_sanitized_html() {
        let h = default_harness();
        let (status, body) = post_json(&h.router, "/api/generate-parody", &style_data_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["html"], "<html>parody</html>");
        assert!(h.model.last_prompt().contains("rgb(10, 20, 30)"));
        assert_eq!(h.provider.counters.acquired(), 0);
    }

    #[tokio::test]
    async fn test_generate_empty_model_answer_is_success() {
        let h = harness(MockBehavior::default(), MockModel::default(), Duration::from_secs(5));
        let (status, body) = post_json(&h.router, "/api/generate-parody", &style_data_body()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["html"], "");
    }

    #[tokio::test]
    async fn test_generate_model_failure_is_502() {
        let model = MockModel { error: Some("rate limited".into()), ..Default::default() };
        let h = harness(MockBehavior::default(), model, Duration::from_secs(5));
        let (status, body) = post_json(&h.router, "/api/generate-parody", &style_data_body()).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "MODEL_INVOCATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_accepts_multi_megabyte_markup() {
        let h = default_harness();
        let body = serde_json::json!({ "styleData": { "rawMarkup": "m".repeat(3_000_000) } }).to_string();
        let (status, json) = post_json(&h.router, "/api/generate-parody", &body).await;

        assert_eq!(status, StatusCode::OK, "{json}");
        assert_eq!(json["html"], "<html>parody</html>");

        let prompt = h.model.last_prompt();
        assert!(prompt.contains(&"m".repeat(10_000)));
        assert!(!prompt.contains(&"m".repeat(10_001)));
    }

    #[tokio::test]
    async fn test_generate_body_over_limit_is_413() {
        let h = harness_with_body_limit(MockBehavior::default(), MockModel::default(), Duration::from_secs(5), 1024);
        let body = serde_json::json!({ "styleData": { "rawMarkup": "m".repeat(4096) } }).to_string();
        let (status, json) = post_json(&h.router, "/api/generate-parody", &body).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(json["error"], "PAYLOAD_TOO_LARGE");
        assert_eq!(h.model.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_generate_requires_style_data() {
        let h = default_harness();
        let (status, body) = post_json(&h.router, "/api/generate-parody", r#"{"html":"x"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}
