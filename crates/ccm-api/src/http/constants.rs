//! Shared constants and header names for the HTTP surface.

/// Header carrying the caller's API key as `key_id:secret`.
pub(crate) const HEADER_API_KEY: &str = "x-ccm-api-key";

/// Header carrying the request correlation id.
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Name of the preference cookie issued to visitors.
pub(crate) const COOKIE_NAME: &str = "custom-cookie-message";

/// Capability required by the upgrade endpoint.
pub(crate) const CAP_UPDATE_PLUGINS: &str = "update_plugins";

/// Action name the upgrade nonce is bound to.
pub(crate) const NONCE_ACTION_UPGRADE: &str = "custom_cookie_message_upgrade";

/// Error code surfaced when the upgrade permission check fails.
pub(crate) const CODE_UPGRADE_PERMISSIONS: &str = "ccm_upgrade_permissions";

/// Error code for internal failures.
pub(crate) const CODE_INTERNAL: &str = "ccm_internal";

/// Error code for missing resources.
pub(crate) const CODE_NOT_FOUND: &str = "ccm_not_found";

/// Message shown to callers failing the upgrade permission check.
pub(crate) const MSG_UPGRADE_PERMISSIONS: &str = "What it is? No, thanks.";

/// Message returned when the upgrade nonce branch turns a caller away.
pub(crate) const MSG_NONCE_REJECTED: &str = "Sorry, who are you?";

/// Message returned when the banner renders to nothing.
pub(crate) const MSG_TEMPLATE_EMPTY: &str = "Please double check your template files.";
