//! File-backed settings store.
//!
//! The store guards the parsed document behind one lock so readers never
//! observe a partially applied migration, and persists by writing a sibling
//! temp file and renaming it over the original.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use argon2::Argon2;
use argon2::password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ApiKeyAuth, Settings};

/// Shared handle to the settings document.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Load the settings document at `path`, falling back to defaults when the
    /// file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let settings = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "settings file absent, starting from defaults");
                Settings::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    operation: "settings.read",
                    path,
                    source,
                });
            }
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(settings)),
            path,
        })
    }

    /// Construct a store over an in-memory document, persisting to `path`.
    #[must_use]
    pub fn with_settings(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
            path: path.into(),
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point-in-time clone of the current document.
    #[must_use]
    pub fn snapshot(&self) -> Settings {
        self.inner
            .read()
            .expect("settings store lock poisoned")
            .clone()
    }

    /// Persist the current document to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub fn persist(&self) -> ConfigResult<()> {
        let snapshot = self.snapshot();
        persist_to(&self.path, &snapshot)
    }

    /// Verify a presented `key_id` + plaintext secret against the stored
    /// records. Unknown keys, disabled keys, and secret mismatches all resolve
    /// to `None`; only malformed stored hashes surface as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored hash cannot be parsed or verification
    /// fails for a reason other than a mismatch.
    pub fn authenticate_api_key(
        &self,
        key_id: &str,
        secret: &str,
    ) -> ConfigResult<Option<ApiKeyAuth>> {
        let record = {
            let guard = self.inner.read().expect("settings store lock poisoned");
            guard
                .api_keys
                .iter()
                .find(|record| record.enabled && record.key_id == key_id)
                .cloned()
        };

        let Some(record) = record else {
            return Ok(None);
        };

        if verify_secret(&record.secret_hash, secret)? {
            Ok(Some(ApiKeyAuth {
                key_id: record.key_id,
                capabilities: record.capabilities.into_iter().collect(),
            }))
        } else {
            Ok(None)
        }
    }

    /// Run `mutate` under the write lock and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the in-memory document keeps the
    /// mutated state so a later persist can retry.
    pub fn update<T>(&self, mutate: impl FnOnce(&mut Settings) -> T) -> ConfigResult<T> {
        let (value, snapshot) = {
            let mut guard = self.inner.write().expect("settings store lock poisoned");
            let value = mutate(&mut guard);
            (value, guard.clone())
        };
        persist_to(&self.path, &snapshot)?;
        Ok(value)
    }
}

fn persist_to(path: &Path, settings: &Settings) -> ConfigResult<()> {
    let json = serde_json::to_string_pretty(settings)
        .map_err(|source| ConfigError::Serialize { source })?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json.as_bytes()).map_err(|source| ConfigError::Io {
        operation: "settings.write_tmp",
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| ConfigError::Io {
        operation: "settings.rename",
        path: path.to_path_buf(),
        source,
    })
}

/// Hash plaintext secret material into an argon2 PHC string for storage.
///
/// # Errors
///
/// Returns an error if the hasher rejects the input.
pub fn hash_api_secret(input: &str) -> ConfigResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(input.as_bytes(), &salt)
        .map_err(|detail| ConfigError::SecretHashFailed { detail })?;
    Ok(hash.to_string())
}

fn verify_secret(expected_hash: &str, candidate: &str) -> ConfigResult<bool> {
    let parsed = PasswordHash::new(expected_hash)
        .map_err(|detail| ConfigError::StoredHashInvalid { detail })?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(detail) => Err(ConfigError::SecretVerifyFailed { detail }),
    }
}
