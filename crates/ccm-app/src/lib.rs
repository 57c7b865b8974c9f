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

//! Consent service bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (dependency loading and the serve loop),
//! `error.rs` (application error type).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Application error type.
pub mod error;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
