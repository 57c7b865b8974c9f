//! Request/response DTOs for the consent surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Problem document surfaced on errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemDetails {
    /// Machine-readable error code.
    pub code: String,
    /// Short, human-readable summary of the issue.
    pub title: String,
    /// HTTP status code associated with the error.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic message when available.
    pub detail: Option<String>,
}

/// Body of a successful banner read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BannerResponse {
    /// Rendered banner markup.
    pub template: String,
}

/// Body of a successful preference cookie write.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreferenceAck {
    /// Always the HTTP status of the write, `200`.
    pub success: u16,
}

/// Parameters accepted by the upgrade endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpgradeParams {
    /// UI-issued nonce confirming the request origin.
    #[serde(rename = "_ccm_nonce", default)]
    pub ccm_nonce: Option<String>,
}

/// Parameters accepted by the preference endpoint.
///
/// Values pass through untyped: query parameters arrive as strings, JSON
/// bodies keep their native types. The `adsvertising` spelling is the wire
/// contract; see DESIGN.md.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceParams {
    /// Functional cookie consent, as supplied by the client.
    #[serde(default)]
    pub functional: Option<Value>,
    /// Advertising cookie consent, as supplied by the client.
    #[serde(default)]
    pub adsvertising: Option<Value>,
}

impl PreferenceParams {
    /// Merge query and body parameters; body values win per field.
    #[must_use]
    pub fn merged(query: Self, body: Option<Self>) -> Self {
        let Some(body) = body else {
            return query;
        };
        Self {
            functional: body.functional.or(query.functional),
            adsvertising: body.adsvertising.or(query.adsvertising),
        }
    }
}

impl UpgradeParams {
    /// Merge query and body parameters; a body nonce wins.
    #[must_use]
    pub fn merged(query: Self, body: Option<Self>) -> Self {
        let Some(body) = body else {
            return query;
        };
        Self {
            ccm_nonce: body.ccm_nonce.or(query.ccm_nonce),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn upgrade_params_use_the_underscored_wire_name() {
        let params: UpgradeParams =
            serde_json::from_value(json!({ "_ccm_nonce": "abc" })).expect("params");
        assert_eq!(params.ccm_nonce.as_deref(), Some("abc"));
    }

    #[test]
    fn preference_params_ignore_the_advertising_spelling() {
        let params: PreferenceParams =
            serde_json::from_value(json!({ "functional": true, "advertising": false }))
                .expect("params");
        assert_eq!(params.functional, Some(json!(true)));
        assert!(params.adsvertising.is_none());
    }

    #[test]
    fn merged_prefers_body_fields() {
        let query = PreferenceParams {
            functional: Some(json!("1")),
            adsvertising: Some(json!("0")),
        };
        let body = PreferenceParams {
            functional: Some(json!(false)),
            adsvertising: None,
        };
        let merged = PreferenceParams::merged(query, Some(body));
        assert_eq!(merged.functional, Some(json!(false)));
        assert_eq!(merged.adsvertising, Some(json!("0")));
    }
}
