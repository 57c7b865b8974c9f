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

//! File-backed settings facade for the cookie-consent service.
//!
//! Layout: `model.rs` (typed settings document), `store.rs` (`SettingsStore`
//! load/persist/authenticate), `migrate.rs` (schema migrations run by the
//! upgrade endpoint).

pub mod error;
pub mod migrate;
pub mod model;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use migrate::CURRENT_SCHEMA_VERSION;
pub use model::{
    ApiKeyAuth, ApiKeyRecord, ApiSettings, BannerSettings, GeneralSettings, Settings,
};
pub use store::{SettingsStore, hash_api_secret};
