//! Settings schema migrations.
//!
//! The upgrade endpoint drives [`SettingsStore::upgrade`], which walks the
//! document from its recorded `schema_version` to [`CURRENT_SCHEMA_VERSION`],
//! persisting once at the end. Each step must be idempotent: documents
//! produced by a newer default set already satisfy every step.

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{DEFAULT_LIFE_TIME, DEFAULT_NAMESPACE, Settings};
use crate::store::SettingsStore;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// One migration step, applied when the document is below the paired version.
type Migration = (u32, fn(&mut Settings));

const MIGRATIONS: &[Migration] = &[
    (1, backfill_life_time),
    (2, backfill_banner_labels),
    (3, normalize_namespace),
];

/// Documents prior to v1 could carry a zero lifetime from the host importer.
fn backfill_life_time(settings: &mut Settings) {
    if settings.general.life_time == 0 {
        settings.general.life_time = DEFAULT_LIFE_TIME;
    }
}

/// v2 split the single banner button into accept + settings controls.
fn backfill_banner_labels(settings: &mut Settings) {
    if settings.banner.accept_label.trim().is_empty() {
        settings.banner.accept_label = "Accept".to_string();
    }
    if settings.banner.settings_label.trim().is_empty() {
        settings.banner.settings_label = "Cookie settings".to_string();
    }
}

/// v3 stopped accepting slashes in the namespace segment.
fn normalize_namespace(settings: &mut Settings) {
    let trimmed = settings.api.namespace.trim_matches('/').to_string();
    settings.api.namespace = if trimmed.is_empty() {
        DEFAULT_NAMESPACE.to_string()
    } else {
        trimmed
    };
}

impl SettingsStore {
    /// Migrate the settings document to the current schema version and
    /// persist it. Returns the number of steps applied (zero when the
    /// document is already current).
    ///
    /// # Errors
    ///
    /// Returns an error if the document reports a schema version newer than
    /// this build, or if persistence fails.
    pub fn upgrade(&self) -> ConfigResult<usize> {
        let version = self.snapshot().schema_version;
        if version > CURRENT_SCHEMA_VERSION {
            return Err(ConfigError::UnknownSchema { version });
        }
        if version == CURRENT_SCHEMA_VERSION {
            return Ok(0);
        }

        self.update(|settings| {
            let mut applied = 0;
            for (target, step) in MIGRATIONS {
                if settings.schema_version < *target {
                    step(settings);
                    settings.schema_version = *target;
                    applied += 1;
                    info!(version = *target, "settings schema migrated");
                }
            }
            applied
        })
    }
}
