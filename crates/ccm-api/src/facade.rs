//! Facade traits wiring the HTTP surface to concrete providers.
//!
//! Mirrors the dependency-injection seam of the settings store: the server is
//! handed trait objects, never globals, so tests can substitute stubs.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ccm_banner::BannerRenderer;
use ccm_config::{ApiKeyAuth, Settings, SettingsStore};

/// Read-only settings access evaluated per request.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Point-in-time clone of the settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings backend is unavailable.
    async fn snapshot(&self) -> Result<Settings>;
    /// Verify a presented API key; mismatches resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key store cannot be consulted at all.
    async fn authenticate_api_key(&self, key_id: &str, secret: &str)
    -> Result<Option<ApiKeyAuth>>;
}

/// Shared settings provider handle.
pub type SharedSettings = Arc<dyn SettingsProvider>;

/// The update routine invoked by the upgrade endpoint.
#[async_trait]
pub trait UpdateRunner: Send + Sync {
    /// Run the update, returning the number of steps applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the update routine fails partway.
    async fn run(&self) -> Result<usize>;
}

/// Shared updater handle.
pub type SharedUpdater = Arc<dyn UpdateRunner>;

/// Shared banner renderer handle.
pub type SharedRenderer = Arc<dyn BannerRenderer>;

#[async_trait]
impl SettingsProvider for SettingsStore {
    async fn snapshot(&self) -> Result<Settings> {
        Ok(Self::snapshot(self))
    }

    async fn authenticate_api_key(
        &self,
        key_id: &str,
        secret: &str,
    ) -> Result<Option<ApiKeyAuth>> {
        Ok(Self::authenticate_api_key(self, key_id, secret)?)
    }
}

#[async_trait]
impl UpdateRunner for SettingsStore {
    async fn run(&self) -> Result<usize> {
        Ok(self.upgrade()?)
    }
}
