//! Liveness check.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthOutput {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthOutput> {
    Json(HealthOutput { status: "ok", version: env!("CARGO_PKG_VERSION") })
}
