//! Action-bound nonce registry.
//!
//! Nonces confirm that a request originated from an expected UI flow. Tokens
//! are bound to an action name and an expiry; verification is non-consuming,
//! so a nonce stays valid for its whole lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;

/// Default nonce lifetime: one day.
pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const NONCE_LENGTH: usize = 24;

/// Token surfaced to the caller at issuance time.
#[derive(Debug, Clone)]
pub struct Nonce {
    /// Token value handed to the UI.
    pub plaintext: String,
    /// Expiry instant for the token.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct NonceEntry {
    action: String,
    expires_at: DateTime<Utc>,
}

/// In-process registry of issued nonces.
#[derive(Clone)]
pub struct NonceRegistry {
    inner: Arc<Mutex<HashMap<String, NonceEntry>>>,
    ttl: chrono::Duration,
}

impl NonceRegistry {
    /// Construct a registry issuing nonces with the given lifetime.
    ///
    /// Lifetimes beyond the representable range fall back to the default.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(24 * 60 * 60));
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a new nonce bound to `action`.
    #[must_use]
    pub fn issue(&self, action: &str) -> Nonce {
        let plaintext = generate_token(NONCE_LENGTH);
        let expires_at = Utc::now() + self.ttl;
        let mut guard = self.inner.lock().expect("nonce registry lock poisoned");
        prune(&mut guard);
        guard.insert(
            plaintext.clone(),
            NonceEntry {
                action: action.to_string(),
                expires_at,
            },
        );
        drop(guard);
        Nonce {
            plaintext,
            expires_at,
        }
    }

    /// Whether `token` is a live nonce for `action`.
    #[must_use]
    pub fn verify(&self, token: &str, action: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let guard = self.inner.lock().expect("nonce registry lock poisoned");
        guard
            .get(token)
            .is_some_and(|entry| entry.action == action && entry.expires_at > Utc::now())
    }
}

impl Default for NonceRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_TTL)
    }
}

fn prune(entries: &mut HashMap<String, NonceEntry>) {
    let now = Utc::now();
    entries.retain(|_, entry| entry.expires_at > now);
}

fn generate_token(length: usize) -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}
