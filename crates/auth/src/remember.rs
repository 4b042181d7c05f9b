//! Remember-me persistence: the client-held token store and the server-side
//! table of issued tokens.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use holdbook_core::{DomainError, RememberTokenId};

use crate::RememberClaims;

/// Key under which the remember-me value is kept in the client store.
pub const REMEMBER_KEY: &str = "holdbook_remember";

/// How a remember-me value found in the client store is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RememberMode {
    /// The value is a server-issued token id; it must resolve to unexpired,
    /// unrevoked claims in the [`IssuedTokens`] table.
    #[default]
    Verified,
    /// The value is the username itself and is trusted if that username is
    /// registered. Anyone who can write the client store can impersonate any
    /// registered user; only for compatibility with clients that already hold
    /// such values.
    IdentityOnly,
}

impl core::str::FromStr for RememberMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verified" => Ok(RememberMode::Verified),
            "identity_only" | "identity-only" | "legacy" => Ok(RememberMode::IdentityOnly),
            other => Err(DomainError::validation(format!(
                "unknown remember mode '{other}' (expected verified|identity_only)"
            ))),
        }
    }
}

/// Client-side key/value capability (a cookie jar, local storage, ...).
///
/// Nothing read from it is trusted without validation.
pub trait RememberStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String, expires_at: DateTime<Utc>);
    fn delete(&mut self, key: &str);
}

/// Plain in-memory client store (tests, non-HTTP callers).
#[derive(Debug, Clone, Default)]
pub struct InMemoryRememberStore {
    values: HashMap<String, (String, DateTime<Utc>)>,
}

impl InMemoryRememberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.values.get(key).map(|(_, exp)| *exp)
    }
}

impl RememberStore for InMemoryRememberStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|(v, _)| v.clone())
    }

    fn set(&mut self, key: &str, value: String, expires_at: DateTime<Utc>) {
        self.values.insert(key.to_string(), (value, expires_at));
    }

    fn delete(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Server-side table of issued remember-me tokens.
pub trait IssuedTokens: Send + Sync {
    fn insert(&self, claims: RememberClaims);
    fn lookup(&self, token_id: RememberTokenId) -> Option<RememberClaims>;
    fn revoke(&self, token_id: RememberTokenId);
}

impl<T> IssuedTokens for Arc<T>
where
    T: IssuedTokens + ?Sized,
{
    fn insert(&self, claims: RememberClaims) {
        (**self).insert(claims)
    }

    fn lookup(&self, token_id: RememberTokenId) -> Option<RememberClaims> {
        (**self).lookup(token_id)
    }

    fn revoke(&self, token_id: RememberTokenId) {
        (**self).revoke(token_id)
    }
}

/// Process-local issued-token table. Tokens do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryIssuedTokens {
    inner: RwLock<HashMap<RememberTokenId, RememberClaims>>,
}

impl InMemoryIssuedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every token that has expired at `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        if let Ok(mut map) = self.inner.write() {
            map.retain(|_, claims| claims.expires_at > now);
        }
    }
}

impl IssuedTokens for InMemoryIssuedTokens {
    fn insert(&self, claims: RememberClaims) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(claims.token_id, claims);
        }
    }

    fn lookup(&self, token_id: RememberTokenId) -> Option<RememberClaims> {
        let map = self.inner.read().ok()?;
        map.get(&token_id).cloned()
    }

    fn revoke(&self, token_id: RememberTokenId) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(&token_id);
        }
    }
}
