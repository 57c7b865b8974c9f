//! HTTP surface modules (router, handlers, middleware).

/// Identity resolution and the upgrade permission check.
pub mod auth;
/// Banner read handler.
pub mod banner;
/// Shared constants and header names.
pub(crate) mod constants;
/// Preference-cookie value and header construction.
pub mod cookie;
/// Problem response helpers and error types.
pub mod errors;
/// Health and diagnostics endpoints.
pub mod health;
/// Preference write handler.
pub mod preference;
/// Router construction and server host.
pub mod router;
/// Metrics middleware for HTTP requests.
pub mod telemetry;
/// Upgrade handler.
pub mod upgrade;
