//! Typed settings document for the cookie-consent service.
//!
//! # Design
//! - Pure data carriers used by the settings store and the API surface.
//! - Serde defaults keep older documents loadable; `migrate.rs` owns the
//!   version bump itself.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default cookie lifetime: thirty days, in seconds.
pub const DEFAULT_LIFE_TIME: u64 = 2_592_000;

/// Default REST namespace the consent routes are mounted under.
pub const DEFAULT_NAMESPACE: &str = "custom-cm";

/// Full settings document persisted on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Document schema version; bumped by migrations.
    #[serde(default)]
    pub schema_version: u32,
    /// Cookie and site-wide settings.
    #[serde(default)]
    pub general: GeneralSettings,
    /// Banner content settings.
    #[serde(default)]
    pub banner: BannerSettings,
    /// HTTP surface settings.
    #[serde(default)]
    pub api: ApiSettings,
    /// API keys accepted by the service, with their capability grants.
    #[serde(default)]
    pub api_keys: Vec<ApiKeyRecord>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: crate::migrate::CURRENT_SCHEMA_VERSION,
            general: GeneralSettings::default(),
            banner: BannerSettings::default(),
            api: ApiSettings::default(),
            api_keys: Vec::new(),
        }
    }
}

/// Cookie and site-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Preference-cookie max-age, in seconds.
    #[serde(default = "default_life_time")]
    pub life_time: u64,
    /// Site URL whose host scopes the preference cookie's domain.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            life_time: DEFAULT_LIFE_TIME,
            site_url: default_site_url(),
        }
    }
}

/// Banner content settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerSettings {
    /// Heading shown above the consent message.
    #[serde(default = "default_heading")]
    pub heading: String,
    /// Consent message body.
    #[serde(default = "default_message")]
    pub message: String,
    /// Label on the accept control.
    #[serde(default = "default_accept_label")]
    pub accept_label: String,
    /// Label on the per-category settings control.
    #[serde(default = "default_settings_label")]
    pub settings_label: String,
    /// Optional path to a custom banner template on disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<PathBuf>,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            heading: default_heading(),
            message: default_message(),
            accept_label: default_accept_label(),
            settings_label: default_settings_label(),
            template_path: None,
        }
    }
}

/// HTTP surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Namespace segment the consent routes are mounted under.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// IP address the API server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: IpAddr,
    /// TCP port the API server binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            bind_addr: default_bind_addr(),
            http_port: default_http_port(),
        }
    }
}

/// Stored API key record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Identifier presented by the caller.
    pub key_id: String,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether the key is accepted at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Argon2 PHC hash of the key secret.
    pub secret_hash: String,
    /// Capabilities granted to callers holding this key.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Authentication context returned for a validated API key.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    /// Identifier of the validated key.
    pub key_id: String,
    /// Capabilities granted to the caller.
    pub capabilities: HashSet<String>,
}

impl ApiKeyAuth {
    /// Whether the caller holds the named capability.
    #[must_use]
    pub fn has_cap(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

fn default_life_time() -> u64 {
    DEFAULT_LIFE_TIME
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_heading() -> String {
    "We use cookies".to_string()
}

fn default_message() -> String {
    "This site stores small pieces of data in your browser to remember your preferences.".to_string()
}

fn default_accept_label() -> String {
    "Accept".to_string()
}

fn default_settings_label() -> String {
    "Cookie settings".to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

const fn default_bind_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

const fn default_http_port() -> u16 {
    7080
}

const fn default_enabled() -> bool {
    true
}
