//! Preference write handler.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use crate::http::cookie::preference_cookie;
use crate::http::errors::ApiError;
use crate::models::{PreferenceAck, PreferenceParams};
use crate::state::ApiState;

/// Terminal outcomes of the preference endpoint.
#[derive(Debug)]
pub(crate) enum PreferenceOutcome {
    /// The cookie header was assembled and is attached to the response.
    Set {
        /// Assembled `Set-Cookie` header value.
        cookie: HeaderValue,
    },
    /// Cookie issuance failed; the response is a bare 500.
    Failed,
}

impl IntoResponse for PreferenceOutcome {
    fn into_response(self) -> Response {
        match self {
            Self::Set { cookie } => {
                let mut response =
                    (StatusCode::OK, Json(PreferenceAck { success: 200 })).into_response();
                response.headers_mut().insert(SET_COOKIE, cookie);
                response
            }
            Self::Failed => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))).into_response()
            }
        }
    }
}

/// `POST /{namespace}/cookie-preference`: persist the visitor's choice as a
/// browser cookie. Values pass through untouched apart from the JSON
/// encoding's numeric collapse; nothing is stored server-side.
pub(crate) async fn create_cookie_preference(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PreferenceParams>,
    body: Option<Json<PreferenceParams>>,
) -> Result<PreferenceOutcome, ApiError> {
    let params = PreferenceParams::merged(query, body.map(|Json(body)| body));

    let settings = state.settings.snapshot().await.map_err(|err| {
        error!(error = %err, "failed to load settings snapshot");
        ApiError::internal("failed to load settings snapshot")
    })?;

    match preference_cookie(&params, &settings) {
        Ok(cookie) => {
            state.telemetry.inc_preference_cookie("set");
            Ok(PreferenceOutcome::Set { cookie })
        }
        Err(err) => {
            warn!(error = %err, "preference cookie issuance failed");
            state.telemetry.inc_preference_cookie("error");
            Ok(PreferenceOutcome::Failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubSettings, state_with_settings};
    use serde_json::json;

    fn query(functional: Option<serde_json::Value>) -> Query<PreferenceParams> {
        Query(PreferenceParams {
            functional,
            adsvertising: None,
        })
    }

    #[tokio::test]
    async fn success_sets_the_cookie_and_acknowledges() {
        let stub = StubSettings::default().with_site("https://example.com", 3600);
        let state = state_with_settings(stub);

        let body = Json(PreferenceParams {
            functional: Some(json!(true)),
            adsvertising: None,
        });
        let outcome = create_cookie_preference(State(state), query(None), Some(body))
            .await
            .expect("outcome");

        let PreferenceOutcome::Set { cookie } = outcome else {
            panic!("expected a cookie");
        };
        let cookie = cookie.to_str().expect("ascii");
        assert!(cookie.starts_with(
            "custom-cookie-message={\"functional\":true,\"advertising\":null}"
        ));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Domain=.example.com"));
    }

    #[tokio::test]
    async fn unusable_site_url_fails_with_a_bare_500() {
        let stub = StubSettings::default().with_site("not a url", 3600);
        let state = state_with_settings(stub);

        let outcome = create_cookie_preference(State(state), query(Some(json!(true))), None)
            .await
            .expect("outcome");

        assert!(matches!(outcome, PreferenceOutcome::Failed));
    }

    #[tokio::test]
    async fn outcome_responses_carry_the_expected_bodies() {
        let stub = StubSettings::default().with_site("https://example.com", 60);
        let state = state_with_settings(stub);

        let ok = create_cookie_preference(State(state), query(Some(json!("1"))), None)
            .await
            .expect("outcome")
            .into_response();
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(ok.headers().contains_key(SET_COOKIE));
        assert_eq!(body_of(ok).await, r#"{"success":200}"#);

        let failed = PreferenceOutcome::Failed.into_response();
        assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!failed.headers().contains_key(SET_COOKIE));
        assert_eq!(body_of(failed).await, "{}");
    }

    async fn body_of(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }
}
