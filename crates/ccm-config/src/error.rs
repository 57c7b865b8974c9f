//! Error types for settings operations.

use std::io;
use std::path::PathBuf;

use argon2::password_hash::Error as PasswordHashError;
use thiserror::Error;

/// Primary error type for settings operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem operation against the settings document failed.
    #[error("settings file operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Settings document could not be parsed.
    #[error("settings document malformed")]
    Parse {
        /// Path of the offending document.
        path: PathBuf,
        /// Source deserialization error.
        source: serde_json::Error,
    },
    /// Settings document could not be serialized for persistence.
    #[error("settings document not serializable")]
    Serialize {
        /// Source serialization error.
        source: serde_json::Error,
    },
    /// Failed to hash secret material.
    #[error("failed to hash secret material")]
    SecretHashFailed {
        /// Hashing error detail.
        detail: PasswordHashError,
    },
    /// Stored secret hash payload was invalid.
    #[error("invalid stored hash")]
    StoredHashInvalid {
        /// Hash parsing error detail.
        detail: PasswordHashError,
    },
    /// Secret verification failed for a reason other than a mismatch.
    #[error("failed to verify secret")]
    SecretVerifyFailed {
        /// Verification error detail.
        detail: PasswordHashError,
    },
    /// Settings document reports a schema version this build does not know.
    #[error("unknown settings schema version")]
    UnknownSchema {
        /// Version found in the document.
        version: u32,
    },
}

/// Convenience alias for settings results.
pub type ConfigResult<T> = Result<T, ConfigError>;
