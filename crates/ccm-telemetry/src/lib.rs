//! Telemetry primitives shared across the consent-service workspace.
//!
//! Centralises logging setup and the Prometheus registry so the application
//! and the HTTP surface adopt a consistent observability story.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::{Span, span::Entered};
use tracing_subscriber::{EnvFilter, fmt};

/// Default logging target when `RUST_LOG` is not provided.
const DEFAULT_LOG_LEVEL: &str = "info";

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for
/// example, because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    BUILD_SHA
        .set(config.build_sha.to_string())
        .ok()
        .or(Some(()));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level));

    let builder = fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))?;

    Ok(())
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Guard that keeps the application-level span entered for the lifetime of
/// the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter an `app` span carrying the phase label and build identifier.
    #[must_use]
    pub fn new(phase: impl Into<String>) -> Self {
        let phase = phase.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", phase = %phase, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

/// Factory for the `x-request-id` generator layer.
#[must_use]
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer that propagates an incoming `x-request-id` header.
#[must_use]
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    banner_renders_total: IntCounterVec,
    preference_cookies_total: IntCounterVec,
    settings_upgrades_total: IntCounter,
    nonce_rejections_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Settings migrations triggered through the upgrade endpoint.
    pub settings_upgrades_total: u64,
    /// Upgrade requests rejected by the nonce branch.
    pub nonce_rejections_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let banner_renders_total = IntCounterVec::new(
            Opts::new("banner_renders_total", "Banner render attempts by outcome"),
            &["status"],
        )?;
        let preference_cookies_total = IntCounterVec::new(
            Opts::new(
                "preference_cookies_total",
                "Preference cookie writes by outcome",
            ),
            &["status"],
        )?;
        let settings_upgrades_total = IntCounter::with_opts(Opts::new(
            "settings_upgrades_total",
            "Settings migrations run via the upgrade endpoint",
        ))?;
        let nonce_rejections_total = IntCounter::with_opts(Opts::new(
            "nonce_rejections_total",
            "Upgrade requests rejected by the nonce branch",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(banner_renders_total.clone()))?;
        registry.register(Box::new(preference_cookies_total.clone()))?;
        registry.register(Box::new(settings_upgrades_total.clone()))?;
        registry.register(Box::new(nonce_rejections_total.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                http_requests_total,
                banner_renders_total,
                preference_cookies_total,
                settings_upgrades_total,
                nonce_rejections_total,
            }),
        })
    }

    /// Increment the HTTP request counter for the given route and status code.
    pub fn inc_http_request(&self, route: &str, status: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    /// Increment the banner render counter for the given outcome.
    pub fn inc_banner_render(&self, status: &str) {
        self.inner
            .banner_renders_total
            .with_label_values(&[status])
            .inc();
    }

    /// Increment the preference cookie counter for the given outcome.
    pub fn inc_preference_cookie(&self, status: &str) {
        self.inner
            .preference_cookies_total
            .with_label_values(&[status])
            .inc();
    }

    /// Increment the settings upgrade counter.
    pub fn inc_settings_upgrade(&self) {
        self.inner.settings_upgrades_total.inc();
    }

    /// Increment the nonce rejection counter.
    pub fn inc_nonce_rejection(&self) {
        self.inner.nonce_rejections_total.inc();
    }

    /// Render the metrics registry using the Prometheus text exposition
    /// format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("failed to encode Prometheus metrics")?;
        String::from_utf8(buffer).context("metrics output was not valid UTF-8")
    }

    /// Take a point-in-time snapshot of the most relevant counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            settings_upgrades_total: self.inner.settings_upgrades_total.get(),
            nonce_rejections_total: self.inner.nonce_rejections_total.get(),
        }
    }
}
