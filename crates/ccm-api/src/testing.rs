//! Shared stub implementations for handler tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use ccm_banner::{BannerError, BannerRenderer};
use ccm_config::{ApiKeyAuth, Settings};
use ccm_telemetry::Metrics;

use crate::facade::{SettingsProvider, UpdateRunner};
use crate::nonce::NonceRegistry;
use crate::state::ApiState;

/// Settings provider over an in-memory document with plaintext key secrets.
#[derive(Clone, Default)]
pub(crate) struct StubSettings {
    settings: Settings,
    keys: Vec<(String, String, Vec<String>)>,
    fail_auth: bool,
}

impl StubSettings {
    pub(crate) fn with_api_key(mut self, key_id: &str, secret: &str, caps: &[&str]) -> Self {
        self.keys.push((
            key_id.to_string(),
            secret.to_string(),
            caps.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    pub(crate) const fn with_auth_failure(mut self) -> Self {
        self.fail_auth = true;
        self
    }

    pub(crate) fn with_site(mut self, site_url: &str, life_time: u64) -> Self {
        self.settings.general.site_url = site_url.to_string();
        self.settings.general.life_time = life_time;
        self
    }
}

#[async_trait]
impl SettingsProvider for StubSettings {
    async fn snapshot(&self) -> Result<Settings> {
        Ok(self.settings.clone())
    }

    async fn authenticate_api_key(
        &self,
        key_id: &str,
        secret: &str,
    ) -> Result<Option<ApiKeyAuth>> {
        if self.fail_auth {
            return Err(anyhow!("key store unavailable"));
        }
        Ok(self
            .keys
            .iter()
            .find(|(id, stored, _)| id == key_id && stored == secret)
            .map(|(id, _, caps)| ApiKeyAuth {
                key_id: id.clone(),
                capabilities: caps.iter().cloned().collect(),
            }))
    }
}

/// Renderer returning a fixed string or a read failure.
pub(crate) struct StubRenderer {
    output: Option<String>,
}

impl StubRenderer {
    pub(crate) fn fixed(output: &str) -> Self {
        Self {
            output: Some(output.to_string()),
        }
    }

    pub(crate) const fn failing() -> Self {
        Self { output: None }
    }
}

impl BannerRenderer for StubRenderer {
    fn render(&self, _settings: &Settings) -> Result<String, BannerError> {
        self.output.clone().ok_or_else(|| BannerError::TemplateRead {
            path: "/stub/banner.html".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "stub"),
        })
    }
}

/// Updater counting its invocations.
#[derive(Clone, Default)]
pub(crate) struct StubUpdater {
    runs: Arc<AtomicUsize>,
    fail: bool,
}

impl StubUpdater {
    pub(crate) fn failing() -> Self {
        Self {
            runs: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }

    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdateRunner for StubUpdater {
    async fn run(&self) -> Result<usize> {
        if self.fail {
            return Err(anyhow!("update failed"));
        }
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

pub(crate) fn state_with_settings(settings: StubSettings) -> Arc<ApiState> {
    state_with(settings, StubRenderer::fixed("<div class=\"ccm-banner\"></div>"))
}

pub(crate) fn state_with(settings: StubSettings, renderer: StubRenderer) -> Arc<ApiState> {
    build_state(settings, renderer, StubUpdater::default())
}

pub(crate) fn state_with_updater(settings: StubSettings, updater: StubUpdater) -> Arc<ApiState> {
    build_state(
        settings,
        StubRenderer::fixed("<div class=\"ccm-banner\"></div>"),
        updater,
    )
}

fn build_state(
    settings: StubSettings,
    renderer: StubRenderer,
    updater: StubUpdater,
) -> Arc<ApiState> {
    Arc::new(ApiState::new(
        Arc::new(settings),
        Arc::new(renderer),
        Arc::new(updater),
        NonceRegistry::default(),
        Metrics::new().expect("metrics"),
    ))
}
