//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use ccm_telemetry::MetricsSnapshot;
use serde::Serialize;
use tracing::error;

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Body of the health probe.
#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    schema_version: u32,
    metrics: MetricsSnapshot,
}

/// `GET /health`: settings reachability plus counter snapshot.
pub(crate) async fn health(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let settings = state.settings.snapshot().await.map_err(|err| {
        error!(error = %err, "health check failed to read settings");
        ApiError::internal("settings are currently unavailable")
    })?;

    Ok(Json(HealthResponse {
        status: "ok",
        schema_version: settings.schema_version,
        metrics: state.telemetry.snapshot(),
    }))
}

/// `GET /metrics`: Prometheus text exposition.
pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "text/plain; version=0.0.4")
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
