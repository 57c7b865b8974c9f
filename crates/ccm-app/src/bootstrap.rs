use std::net::SocketAddr;
use std::sync::Arc;

use ccm_api::ApiServer;
use ccm_banner::TemplateRenderer;
use ccm_config::SettingsStore;
use ccm_telemetry::{GlobalContextGuard, LoggingConfig, Metrics};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Environment variable selecting the settings document path.
const ENV_SETTINGS_PATH: &str = "CCM_SETTINGS";

/// Fallback settings document path.
const DEFAULT_SETTINGS_PATH: &str = "ccm-settings.json";

/// Dependencies required to bootstrap the application.
pub(crate) struct BootstrapDependencies {
    logging: LoggingConfig<'static>,
    store: SettingsStore,
    telemetry: Metrics,
}

impl BootstrapDependencies {
    /// Construct production dependencies from the environment.
    pub(crate) fn from_env() -> AppResult<Self> {
        let logging = LoggingConfig::default();
        let path = settings_path(std::env::var(ENV_SETTINGS_PATH).ok().as_deref());
        let store =
            SettingsStore::load(path).map_err(|err| AppError::config("settings.load", err))?;
        let telemetry =
            Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

        Ok(Self {
            logging,
            store,
            telemetry,
        })
    }
}

/// Entry point for the application boot sequence.
///
/// # Errors
///
/// Returns an error if dependency construction or application startup fails.
pub async fn run_app() -> AppResult<()> {
    let dependencies = BootstrapDependencies::from_env()?;
    run_app_with(dependencies).await
}

/// Boot sequence relying entirely on injected dependencies to simplify
/// testing.
pub(crate) async fn run_app_with(dependencies: BootstrapDependencies) -> AppResult<()> {
    ccm_telemetry::init_logging(&dependencies.logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("bootstrap");

    info!("Consent service bootstrap starting");

    let BootstrapDependencies {
        logging: _,
        store,
        telemetry,
    } = dependencies;

    info!(settings = %store.path().display(), "Settings document loaded");
    let snapshot = store.snapshot();
    let addr = bind_address(snapshot.api.bind_addr, snapshot.api.http_port)?;

    let api = ApiServer::new(store, Arc::new(TemplateRenderer), telemetry);

    info!(addr = %addr, "Launching API listener");
    api.serve(addr)
        .await
        .map_err(|err| AppError::api_server("api_server.serve", err))?;

    info!("API server shutdown complete");
    Ok(())
}

fn settings_path(from_env: Option<&str>) -> String {
    from_env
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_SETTINGS_PATH)
        .to_string()
}

fn bind_address(addr: std::net::IpAddr, port: u16) -> AppResult<SocketAddr> {
    if port == 0 {
        return Err(AppError::InvalidConfig {
            field: "http_port",
            reason: "zero",
            value: Some(port.to_string()),
        });
    }
    Ok(SocketAddr::new(addr, port))
}
