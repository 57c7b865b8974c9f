#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! REST surface for the cookie-consent banner service.
//!
//! Three operations live under a configurable namespace (default
//! `custom-cm`): a guarded settings upgrade, the banner markup read, and the
//! visitor preference cookie write. `/health` and `/metrics` sit outside the
//! namespace.

/// Facade traits decoupling the surface from concrete providers.
pub mod facade;
/// HTTP routing, handlers, and middleware.
pub mod http;
/// Request/response DTOs.
pub mod models;
/// Action-bound nonce registry.
pub mod nonce;
/// Shared request state.
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use facade::{SettingsProvider, SharedRenderer, SharedSettings, SharedUpdater, UpdateRunner};
pub use http::router::ApiServer;
pub use nonce::{Nonce, NonceRegistry};
