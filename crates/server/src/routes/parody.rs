//! `POST /api/parody`: fingerprint and synthesize in one request.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ParodyParams {
    pub url: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParodyOutput {
    pub parody_html: String,
}

pub async fn parody(
    State(state): State<AppState>, payload: Result<Json<ParodyParams>, JsonRejection>,
) -> Result<Json<ParodyOutput>, ApiError> {
    let Json(params) = payload?;
    tracing::info!(url = %params.url, model = ?params.model, "parody requested");

    let pipeline = state.pipeline.clone();
    let parody_html = state
        .run_cancellable(move |cancel| async move { pipeline.run(&params.url, params.model.as_deref(), &cancel).await })
        .await?;

    Ok(Json(ParodyOutput { parody_html }))
}
