//! Router construction and server host.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    http::{HeaderName, Method, Request, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use ccm_config::SettingsStore;
use ccm_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::facade::{SharedRenderer, SharedSettings, SharedUpdater};
use crate::http::auth::{require_update_plugins, resolve_identity};
use crate::http::banner::read_banner;
use crate::http::constants::{HEADER_API_KEY, HEADER_REQUEST_ID};
use crate::http::health::{health, metrics};
use crate::http::preference::create_cookie_preference;
use crate::http::telemetry::HttpMetricsLayer;
use crate::http::upgrade::upgrade;
use crate::nonce::NonceRegistry;
use crate::state::ApiState;

/// Axum router wrapper hosting the consent surface.
pub struct ApiServer {
    router: Router,
    nonces: NonceRegistry,
}

impl ApiServer {
    /// Construct the server over a concrete settings store, which doubles as
    /// the update routine behind the upgrade endpoint.
    #[must_use]
    pub fn new(store: SettingsStore, renderer: SharedRenderer, telemetry: Metrics) -> Self {
        let namespace = store.snapshot().api.namespace;
        let settings: SharedSettings = Arc::new(store.clone());
        let updater: SharedUpdater = Arc::new(store);
        Self::with_dependencies(
            settings,
            renderer,
            updater,
            NonceRegistry::default(),
            telemetry,
            &namespace,
        )
    }

    pub(crate) fn with_dependencies(
        settings: SharedSettings,
        renderer: SharedRenderer,
        updater: SharedUpdater,
        nonces: NonceRegistry,
        telemetry: Metrics,
        namespace: &str,
    ) -> Self {
        let state = Arc::new(ApiState::new(
            settings,
            renderer,
            updater,
            nonces.clone(),
            telemetry.clone(),
        ));

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, HeaderName::from_static(HEADER_API_KEY)]);

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(ccm_telemetry::propagate_request_id_layer())
            .layer(ccm_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::build_router(&state, namespace)
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router, nonces }
    }

    fn build_router(state: &Arc<ApiState>, namespace: &str) -> Router<Arc<ApiState>> {
        let identity = middleware::from_fn_with_state(state.clone(), resolve_identity);
        let require_cap = middleware::from_fn(require_update_plugins);

        Router::new()
            .route(
                &format!("/{namespace}/upgrade"),
                post(upgrade)
                    .route_layer(require_cap)
                    .route_layer(identity),
            )
            .route(&format!("/{namespace}/banner"), get(read_banner))
            .route(
                &format!("/{namespace}/cookie-preference"),
                post(create_cookie_preference),
            )
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    /// Registry the embedding admin surface mints UI nonces from.
    #[must_use]
    pub const fn nonces(&self) -> &NonceRegistry {
        &self.nonces
    }

    /// Serve the API using the configured router on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server
    /// terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        tracing::info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service()).await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}
