//! # Design
//!
//! - Centralize application-level errors for bootstrap and serving.
//! - Keep error messages constant while carrying context fields for
//!   debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings operations failed.
    #[error("settings operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source settings error.
        source: ccm_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed: {error}")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying telemetry error.
        error: anyhow::Error,
    },
    /// API server operations failed.
    #[error("api server operation failed: {error}")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying API server error.
        error: anyhow::Error,
    },
    /// Configuration values were invalid.
    #[error("invalid configuration")]
    InvalidConfig {
        /// Field name that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Optional value associated with the failure.
        value: Option<String>,
    },
}

impl AppError {
    /// Wrap a settings error with its operation identifier.
    #[must_use]
    pub const fn config(operation: &'static str, source: ccm_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    /// Wrap a telemetry error with its operation identifier.
    #[must_use]
    pub const fn telemetry(operation: &'static str, error: anyhow::Error) -> Self {
        Self::Telemetry { operation, error }
    }

    /// Wrap an API server error with its operation identifier.
    #[must_use]
    pub const fn api_server(operation: &'static str, error: anyhow::Error) -> Self {
        Self::ApiServer { operation, error }
    }
}
