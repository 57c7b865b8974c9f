//! Banner read handler.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{error, warn};

use crate::http::constants::MSG_TEMPLATE_EMPTY;
use crate::http::errors::ApiError;
use crate::models::BannerResponse;
use crate::state::ApiState;

/// `GET /{namespace}/banner`: capture the rendered banner markup.
pub(crate) async fn read_banner(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BannerResponse>, ApiError> {
    let settings = state.settings.snapshot().await.map_err(|err| {
        error!(error = %err, "failed to load settings snapshot");
        ApiError::internal("failed to load settings snapshot")
    })?;

    let template = match state.renderer.render(&settings) {
        Ok(template) => template,
        Err(err) => {
            warn!(error = %err, "banner render failed");
            state.telemetry.inc_banner_render("error");
            return Err(ApiError::not_found(MSG_TEMPLATE_EMPTY));
        }
    };

    if template.trim().is_empty() {
        state.telemetry.inc_banner_render("empty");
        return Err(ApiError::not_found(MSG_TEMPLATE_EMPTY));
    }

    state.telemetry.inc_banner_render("ok");
    Ok(Json(BannerResponse { template }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubRenderer, StubSettings, state_with};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn non_empty_markup_is_returned_verbatim() {
        let state = state_with(
            StubSettings::default(),
            StubRenderer::fixed("<div>X</div>"),
        );

        let Json(body) = read_banner(State(state)).await.expect("banner");
        assert_eq!(body.template, "<div>X</div>");
    }

    #[tokio::test]
    async fn empty_markup_is_a_404() {
        let state = state_with(StubSettings::default(), StubRenderer::fixed("  \n"));

        let err = read_banner(State(state)).await.expect_err("missing");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn render_failures_are_a_404() {
        let state = state_with(StubSettings::default(), StubRenderer::failing());

        let err = read_banner(State(state)).await.expect_err("missing");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
