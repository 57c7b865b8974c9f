//! Upgrade handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::http::constants::{MSG_NONCE_REJECTED, NONCE_ACTION_UPGRADE};
use crate::http::errors::ApiError;
use crate::models::UpgradeParams;
use crate::state::ApiState;

/// Terminal outcomes of the upgrade endpoint.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum UpgradeOutcome {
    /// The nonce branch turned the caller away.
    Rejected,
    /// The update routine ran.
    Completed,
}

impl IntoResponse for UpgradeOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected => {
                (StatusCode::BAD_REQUEST, Json(MSG_NONCE_REJECTED)).into_response()
            }
            Self::Completed => StatusCode::OK.into_response(),
        }
    }
}

/// `POST /{namespace}/upgrade`: run the settings update behind the nonce
/// branch. A nonce that verifies against the upgrade action short-circuits
/// with a 400; the update runs only when verification fails.
pub(crate) async fn upgrade(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<UpgradeParams>,
    body: Option<Json<UpgradeParams>>,
) -> Result<UpgradeOutcome, ApiError> {
    let params = UpgradeParams::merged(query, body.map(|Json(body)| body));
    let nonce = params.ccm_nonce.unwrap_or_default();

    if state.nonces.verify(&nonce, NONCE_ACTION_UPGRADE) {
        state.telemetry.inc_nonce_rejection();
        warn!("upgrade request turned away by the nonce branch");
        return Ok(UpgradeOutcome::Rejected);
    }

    let applied = state.updater.run().await.map_err(|err| {
        error!(error = %err, "settings update failed");
        ApiError::internal("failed to run the settings update")
    })?;

    state.telemetry.inc_settings_upgrade();
    info!(applied, "settings update completed");
    Ok(UpgradeOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubSettings, StubUpdater, state_with_updater};

    fn params(nonce: Option<&str>) -> Query<UpgradeParams> {
        Query(UpgradeParams {
            ccm_nonce: nonce.map(ToString::to_string),
        })
    }

    #[tokio::test]
    async fn verifying_nonce_rejects_without_running_the_update() {
        let updater = StubUpdater::default();
        let state = state_with_updater(StubSettings::default(), updater.clone());
        let nonce = state.nonces.issue(NONCE_ACTION_UPGRADE);

        let outcome = upgrade(
            State(state),
            params(Some(&nonce.plaintext)),
            None,
        )
        .await
        .expect("outcome");

        assert_eq!(outcome, UpgradeOutcome::Rejected);
        assert_eq!(updater.runs(), 0);
    }

    #[tokio::test]
    async fn failing_nonce_runs_the_update_exactly_once() {
        let updater = StubUpdater::default();
        let state = state_with_updater(StubSettings::default(), updater.clone());

        let outcome = upgrade(State(state), params(Some("never-issued")), None)
            .await
            .expect("outcome");

        assert_eq!(outcome, UpgradeOutcome::Completed);
        assert_eq!(updater.runs(), 1);
    }

    #[tokio::test]
    async fn absent_nonce_also_runs_the_update() {
        let updater = StubUpdater::default();
        let state = state_with_updater(StubSettings::default(), updater.clone());

        let outcome = upgrade(State(state), params(None), None)
            .await
            .expect("outcome");

        assert_eq!(outcome, UpgradeOutcome::Completed);
        assert_eq!(updater.runs(), 1);
    }

    #[tokio::test]
    async fn a_nonce_for_another_action_does_not_reject() {
        let updater = StubUpdater::default();
        let state = state_with_updater(StubSettings::default(), updater.clone());
        let nonce = state.nonces.issue("some_other_action");

        let outcome = upgrade(State(state), params(Some(&nonce.plaintext)), None)
            .await
            .expect("outcome");

        assert_eq!(outcome, UpgradeOutcome::Completed);
        assert_eq!(updater.runs(), 1);
    }

    #[tokio::test]
    async fn body_nonce_wins_over_query() {
        let updater = StubUpdater::default();
        let state = state_with_updater(StubSettings::default(), updater.clone());
        let nonce = state.nonces.issue(NONCE_ACTION_UPGRADE);

        let body = Json(UpgradeParams {
            ccm_nonce: Some(nonce.plaintext.clone()),
        });
        let outcome = upgrade(State(state), params(Some("stale")), Some(body))
            .await
            .expect("outcome");

        assert_eq!(outcome, UpgradeOutcome::Rejected);
        assert_eq!(updater.runs(), 0);
    }

    #[tokio::test]
    async fn updater_failures_surface_as_internal_errors() {
        let updater = StubUpdater::failing();
        let state = state_with_updater(StubSettings::default(), updater);

        let err = upgrade(State(state), params(None), None)
            .await
            .expect_err("error");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn outcomes_map_to_their_status_codes() {
        assert_eq!(
            UpgradeOutcome::Rejected.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UpgradeOutcome::Completed.into_response().status(),
            StatusCode::OK
        );
    }
}
