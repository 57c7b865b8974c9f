//! Preference-cookie value and header construction.
//!
//! The cookie value is the JSON encoding of the submitted preference pair
//! with numeric strings collapsed to numbers and HTML entities decoded.
//! Header construction can fail (non-ASCII payloads, unusable site URL);
//! the endpoint maps any such failure to its 500 branch.

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use ccm_config::Settings;

use crate::http::constants::COOKIE_NAME;
use crate::models::PreferenceParams;

/// Error type for cookie issuance.
#[derive(Debug, Error)]
pub enum CookieError {
    /// The configured site URL could not be parsed.
    #[error("site URL is not parsable")]
    InvalidSiteUrl {
        /// Source parse error.
        source: url::ParseError,
    },
    /// The configured site URL has no host component.
    #[error("site URL has no host")]
    MissingHost,
    /// The assembled cookie did not form a valid header value.
    #[error("cookie not representable as a header value")]
    InvalidHeader {
        /// Source header error.
        source: InvalidHeaderValue,
    },
    /// The preference payload could not be encoded.
    #[error("preference payload not encodable")]
    Encode {
        /// Source serialization error.
        source: serde_json::Error,
    },
}

/// Assemble the `Set-Cookie` header for a preference submission.
///
/// # Errors
///
/// Returns an error when the site URL yields no usable domain or the value
/// cannot be carried in a header.
pub fn preference_cookie(
    params: &PreferenceParams,
    settings: &Settings,
) -> Result<HeaderValue, CookieError> {
    let value = cookie_value(params)?;
    let domain = cookie_domain(&settings.general.site_url)?;
    let header = format!(
        "{COOKIE_NAME}={value}; Max-Age={}; Path=/; Domain={domain}",
        settings.general.life_time,
    );
    HeaderValue::from_str(&header).map_err(|source| CookieError::InvalidHeader { source })
}

/// Cookie payload; member order is part of the stored shape.
#[derive(Serialize)]
struct CookiePayload {
    functional: Value,
    advertising: Value,
}

/// JSON value stored in the cookie. The advertising member is fed from the
/// `adsvertising` wire field; nothing else is read for it.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
pub fn cookie_value(params: &PreferenceParams) -> Result<String, CookieError> {
    let payload = CookiePayload {
        functional: coerce_numeric(params.functional.clone().unwrap_or(Value::Null)),
        advertising: coerce_numeric(params.adsvertising.clone().unwrap_or(Value::Null)),
    };
    let encoded =
        serde_json::to_string(&payload).map_err(|source| CookieError::Encode { source })?;
    Ok(html_escape::decode_html_entities(&encoded).into_owned())
}

/// Scope the cookie to the site host, dot-prefixed to include subdomains.
///
/// # Errors
///
/// Returns an error if the URL does not parse or carries no host.
pub fn cookie_domain(site_url: &str) -> Result<String, CookieError> {
    let url = Url::parse(site_url).map_err(|source| CookieError::InvalidSiteUrl { source })?;
    let host = url.host_str().ok_or(CookieError::MissingHost)?;
    Ok(format!(".{host}"))
}

/// Collapse numeric strings into JSON numbers, recursively.
fn coerce_numeric(value: Value) -> Value {
    match value {
        Value::String(text) => {
            if let Ok(int) = text.parse::<i64>() {
                Value::Number(int.into())
            } else if let Some(number) = text
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
            {
                Value::Number(number)
            } else {
                Value::String(text)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_numeric).collect()),
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, coerce_numeric(value)))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings_for(site_url: &str, life_time: u64) -> Settings {
        let mut settings = Settings::default();
        settings.general.site_url = site_url.to_string();
        settings.general.life_time = life_time;
        settings
    }

    #[test]
    fn value_keeps_unread_advertising_null() {
        let params = PreferenceParams {
            functional: Some(json!(true)),
            adsvertising: None,
        };
        assert_eq!(
            cookie_value(&params).expect("value"),
            r#"{"functional":true,"advertising":null}"#
        );
    }

    #[test]
    fn adsvertising_feeds_the_advertising_member() {
        let params = PreferenceParams {
            functional: Some(json!(true)),
            adsvertising: Some(json!(false)),
        };
        assert_eq!(
            cookie_value(&params).expect("value"),
            r#"{"functional":true,"advertising":false}"#
        );
    }

    #[test]
    fn numeric_strings_collapse_to_numbers() {
        let params = PreferenceParams {
            functional: Some(json!("1")),
            adsvertising: Some(json!("0.5")),
        };
        assert_eq!(
            cookie_value(&params).expect("value"),
            r#"{"functional":1,"advertising":0.5}"#
        );
    }

    #[test]
    fn entities_in_submitted_values_are_decoded() {
        let params = PreferenceParams {
            functional: Some(json!("yes &amp; no")),
            adsvertising: None,
        };
        assert!(cookie_value(&params).expect("value").contains("yes & no"));
    }

    #[test]
    fn domain_is_the_dotted_site_host() {
        assert_eq!(
            cookie_domain("https://example.com/blog").expect("domain"),
            ".example.com"
        );
    }

    #[test]
    fn unparsable_site_url_is_an_error() {
        assert!(matches!(
            cookie_domain("not a url"),
            Err(CookieError::InvalidSiteUrl { .. })
        ));
    }

    #[test]
    fn header_carries_name_value_and_attributes() {
        let params = PreferenceParams {
            functional: Some(json!(true)),
            adsvertising: None,
        };
        let header = preference_cookie(&params, &settings_for("https://example.com", 3600))
            .expect("header");
        let header = header.to_str().expect("ascii");
        assert!(header.starts_with("custom-cookie-message="));
        assert!(header.contains("Max-Age=3600"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Domain=.example.com"));
    }

    #[test]
    fn non_ascii_payloads_fail_header_construction() {
        let params = PreferenceParams {
            functional: Some(json!("oui\u{202f}!")),
            adsvertising: None,
        };
        assert!(matches!(
            preference_cookie(&params, &settings_for("https://example.com", 3600)),
            Err(CookieError::InvalidHeader { .. })
        ));
    }
}
