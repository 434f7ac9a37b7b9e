//! `POST /api/scrape`: render a page and return its fingerprint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use parodist_core::Fingerprint;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeParams {
    pub url: String,

    /// Capture the full rendered markup as `rawMarkup`.
    #[serde(default = "default_true")]
    pub capture_html: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct ScrapeOutput {
    pub success: bool,
    pub data: Fingerprint,
}

pub async fn scrape(
    State(state): State<AppState>, payload: Result<Json<ScrapeParams>, JsonRejection>,
) -> Result<Json<ScrapeOutput>, ApiError> {
    let Json(params) = payload?;
    tracing::info!(url = %params.url, capture_html = params.capture_html, "scrape requested");

    let extractor = state.pipeline.extractor.clone();
    let data = state
        .run_cancellable(move |cancel| async move {
            extractor.extract(&params.url, params.capture_html, &cancel).await
        })
        .await?;

    Ok(Json(ScrapeOutput { success: true, data }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use parodist_client::testing::{MockBehavior, MockModel};

    use crate::routes::test_support::*;

    #[tokio::test]
    async fn test_scrape_returns_fingerprint() {
        let h = default_harness();
        let (status, body) = post_json(&h.router, "/api/scrape", r#"{"url":"http://127.0.0.1/demo"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["metadata"]["description"], "demo");
        assert_eq!(body["data"]["headings"], serde_json::json!(["Welcome"]));
        assert!(body["data"]["colorPalette"].as_array().unwrap().contains(&"rgb(10, 20, 30)".into()));
        assert!(body["data"]["rawMarkup"].as_str().unwrap().contains("<h1>Welcome</h1>"));
        assert_eq!(h.provider.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_scrape_without_markup() {
        let h = default_harness();
        let (status, body) =
            post_json(&h.router, "/api/scrape", r#"{"url":"http://127.0.0.1/demo","captureHtml":false}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].get("rawMarkup").is_none());
        assert_eq!(h.provider.counters.markup_reads(), 0);
    }

    #[tokio::test]
    async fn test_scrape_invalid_url_is_400() {
        let h = default_harness();
        let (status, body) = post_json(&h.router, "/api/scrape", r#"{"url":"not a url"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_INPUT");
        assert!(body["details"].as_str().is_some());
        assert_eq!(h.provider.counters.acquired(), 0);
    }

    #[tokio::test]
    async fn test_scrape_malformed_body_is_400() {
        let h = default_harness();
        for body in ["{", r#"{"captureHtml":true}"#, r#"{"url":42}"#] {
            let (status, json) = post_json(&h.router, "/api/scrape", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["error"], "INVALID_INPUT");
        }
        assert_eq!(h.provider.counters.acquired(), 0);
    }

    #[tokio::test]
    async fn test_scrape_extraction_failure_is_500() {
        let behavior = MockBehavior { evaluate_result: Err("SecurityError".into()), ..Default::default() };
        let h = harness(behavior, MockModel::default(), Duration::from_secs(5));
        let (status, body) = post_json(&h.router, "/api/scrape", r#"{"url":"http://127.0.0.1/demo"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "EXTRACTION_ERROR");
        assert_eq!(h.provider.counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_scrape_browser_unavailable_is_503() {
        let behavior = MockBehavior { acquire_error: Some("no chrome".into()), ..Default::default() };
        let h = harness(behavior, MockModel::default(), Duration::from_secs(5));
        let (status, body) = post_json(&h.router, "/api/scrape", r#"{"url":"http://127.0.0.1/demo"}"#).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "BROWSER_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_scrape_timeout_still_closes_session() {
        let behavior = MockBehavior { navigate_delay: Duration::from_secs(3), ..Default::default() };
        let h = harness(behavior, MockModel::default(), Duration::from_millis(100));
        let (status, body) = post_json(&h.router, "/api/scrape", r#"{"url":"http://127.0.0.1/demo"}"#).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "TIMEOUT");

        for _ in 0..50 {
            if h.provider.counters.closed() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(h.provider.counters.closed(), 1);
    }
}
