//! Shared request state for the HTTP surface.

use ccm_telemetry::Metrics;

use crate::facade::{SharedRenderer, SharedSettings, SharedUpdater};
use crate::nonce::NonceRegistry;

/// Dependencies shared by every handler, wired explicitly at construction.
pub struct ApiState {
    /// Per-request settings access.
    pub settings: SharedSettings,
    /// Banner markup renderer.
    pub renderer: SharedRenderer,
    /// Update routine behind the upgrade endpoint.
    pub updater: SharedUpdater,
    /// Registry backing the upgrade nonce check.
    pub nonces: NonceRegistry,
    /// Metrics handle.
    pub telemetry: Metrics,
}

impl ApiState {
    /// Bundle the handler dependencies.
    #[must_use]
    pub fn new(
        settings: SharedSettings,
        renderer: SharedRenderer,
        updater: SharedUpdater,
        nonces: NonceRegistry,
        telemetry: Metrics,
    ) -> Self {
        Self {
            settings,
            renderer,
            updater,
            nonces,
            telemetry,
        }
    }
}
