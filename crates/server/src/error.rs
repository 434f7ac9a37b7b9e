//! HTTP error responses for the parodist server.
//!
//! Every failure leaves the boundary as `{ "error": CODE, "details": msg }`
//! with a status derived from the category code.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parodist_core::Error;
use serde::Serialize;

/// Wire shape of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub details: String,
}

/// A pipeline error on its way out of a handler.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError(Error::PayloadTooLarge(rejection.body_text()))
        } else {
            ApiError(Error::InvalidInput(rejection.body_text()))
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::BlockedTarget(_) => StatusCode::FORBIDDEN,
            Error::Navigation(_) | Error::ModelInvocation(_) => StatusCode::BAD_GATEWAY,
            Error::BrowserUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Error::Extraction(_) | Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody { error: self.0.code(), details: self.0.details() };

        if status.is_server_error() {
            tracing::error!(code = body.error, details = %body.details, "request failed");
        } else {
            tracing::info!(code = body.error, details = %body.details, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
