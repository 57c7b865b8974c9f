//! Identity resolution and the upgrade permission check.
//!
//! Callers present an API key via the `x-ccm-api-key` header. Requests with
//! no key, an unknown key, or a wrong secret resolve to the anonymous
//! identity with an empty capability set; the protected route then fails its
//! capability check rather than the transport failing authentication.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{extract::State, http::Request, middleware::Next, response::Response};
use tracing::{debug, error};

use crate::http::constants::{CAP_UPDATE_PLUGINS, HEADER_API_KEY, MSG_UPGRADE_PERMISSIONS};
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// Caller identity resolved once per request.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    /// Key id of an authenticated caller, `None` for anonymous.
    pub key_id: Option<String>,
    /// Capabilities granted to the caller.
    pub capabilities: HashSet<String>,
}

impl CallerIdentity {
    /// The identity carried by unauthenticated requests.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            key_id: None,
            capabilities: HashSet::new(),
        }
    }

    /// Whether the caller holds the named capability.
    #[must_use]
    pub fn has_cap(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

impl From<ccm_config::ApiKeyAuth> for CallerIdentity {
    fn from(auth: ccm_config::ApiKeyAuth) -> Self {
        Self {
            key_id: Some(auth.key_id),
            capabilities: auth.capabilities,
        }
    }
}

/// Middleware resolving the caller identity from the API key header.
pub(crate) async fn resolve_identity(
    State(state): State<Arc<ApiState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = req
        .headers()
        .get(HEADER_API_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    let identity = identity_for(&state, presented.as_deref()).await?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Resolve the presented credential to an identity. Absent or rejected
/// credentials yield the anonymous identity; only provider failures error.
pub(crate) async fn identity_for(
    state: &ApiState,
    presented: Option<&str>,
) -> Result<CallerIdentity, ApiError> {
    let Some(raw) = presented else {
        return Ok(CallerIdentity::anonymous());
    };

    let Some((key_id, secret)) = raw.split_once(':') else {
        debug!("API key header missing the key_id:secret shape");
        return Ok(CallerIdentity::anonymous());
    };

    let auth = state
        .settings
        .authenticate_api_key(key_id, secret)
        .await
        .map_err(|err| {
            error!(error = %err, "failed to verify API key");
            ApiError::internal("failed to verify API key")
        })?;

    Ok(auth.map_or_else(CallerIdentity::anonymous, CallerIdentity::from))
}

/// Permission check guarding the upgrade endpoint.
///
/// # Errors
///
/// Returns the `ccm_upgrade_permissions` error (HTTP 403) when the caller
/// lacks the `update_plugins` capability.
pub fn upgrade_permissions(identity: &CallerIdentity) -> Result<(), ApiError> {
    if identity.has_cap(CAP_UPDATE_PLUGINS) {
        Ok(())
    } else {
        Err(ApiError::upgrade_permissions(MSG_UPGRADE_PERMISSIONS))
    }
}

/// Middleware form of [`upgrade_permissions`], applied to the upgrade route.
pub(crate) async fn require_update_plugins(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<CallerIdentity>()
        .cloned()
        .unwrap_or_else(CallerIdentity::anonymous);
    upgrade_permissions(&identity)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::constants::CODE_UPGRADE_PERMISSIONS;
    use crate::testing::{StubSettings, state_with_settings};
    use axum::http::StatusCode;

    #[test]
    fn anonymous_callers_are_denied_with_the_named_code() {
        let err = upgrade_permissions(&CallerIdentity::anonymous()).expect_err("denied");
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.code, CODE_UPGRADE_PERMISSIONS);
    }

    #[test]
    fn capable_callers_are_allowed() {
        let identity = CallerIdentity {
            key_id: Some("ops".to_string()),
            capabilities: [CAP_UPDATE_PLUGINS.to_string()].into_iter().collect(),
        };
        assert!(upgrade_permissions(&identity).is_ok());
    }

    #[tokio::test]
    async fn missing_and_malformed_credentials_resolve_to_anonymous() {
        let state = state_with_settings(StubSettings::default());

        let identity = identity_for(&state, None).await.expect("resolve");
        assert!(identity.key_id.is_none());

        let identity = identity_for(&state, Some("no-colon-here"))
            .await
            .expect("resolve");
        assert!(identity.key_id.is_none());
    }

    #[tokio::test]
    async fn valid_credentials_carry_their_capabilities() {
        let stub = StubSettings::default().with_api_key(
            "ops",
            "hunter2",
            &[CAP_UPDATE_PLUGINS],
        );
        let state = state_with_settings(stub);

        let identity = identity_for(&state, Some("ops:hunter2"))
            .await
            .expect("resolve");
        assert_eq!(identity.key_id.as_deref(), Some("ops"));
        assert!(identity.has_cap(CAP_UPDATE_PLUGINS));
    }

    #[tokio::test]
    async fn rejected_credentials_resolve_to_anonymous() {
        let stub = StubSettings::default().with_api_key("ops", "hunter2", &[]);
        let state = state_with_settings(stub);

        let identity = identity_for(&state, Some("ops:wrong"))
            .await
            .expect("resolve");
        assert!(identity.key_id.is_none());
    }

    #[tokio::test]
    async fn provider_failures_surface_as_internal_errors() {
        let stub = StubSettings::default().with_auth_failure();
        let state = state_with_settings(stub);

        let err = identity_for(&state, Some("ops:hunter2"))
            .await
            .expect_err("error");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
