//! AuthGate: credential checks, bounded retries and remember-me resumption.
//!
//! The gate owns no session state. Callers hand it the [`Session`] of the
//! current connection plus the client's [`RememberStore`] and it performs the
//! transition in place. Failure is never an `Err`: a denied check is
//! `granted == false`, a bad login is [`LoginOutcome::Rejected`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use holdbook_core::RememberTokenId;

use crate::claims::{RememberClaims, validate_claims};
use crate::remember::{IssuedTokens, REMEMBER_KEY, RememberMode, RememberStore};
use crate::session::{GateState, Session};
use crate::{CredentialRegistry, Credentials, Identity};

/// Tunables of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    /// Failed submissions after which the session locks.
    pub max_attempts: u32,
    /// Lifetime of a remember-me token.
    pub remember_ttl: Duration,
    pub remember_mode: RememberMode,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            remember_ttl: Duration::hours(24),
            remember_mode: RememberMode::Verified,
        }
    }
}

/// Result of [`AuthGate::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessCheck {
    pub granted: bool,
    pub identity: Option<Identity>,
}

impl AccessCheck {
    fn granted(identity: Identity) -> Self {
        Self {
            granted: true,
            identity: Some(identity),
        }
    }

    fn denied() -> Self {
        Self {
            granted: false,
            identity: None,
        }
    }
}

/// Result of [`AuthGate::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Granted(Identity),
    Rejected { attempts_remaining: u32 },
    Locked,
}

impl LoginOutcome {
    /// Convert into a `Result` for callers that surface failures as errors.
    pub fn into_result(self) -> Result<Identity, AuthError> {
        match self {
            LoginOutcome::Granted(identity) => Ok(identity),
            LoginOutcome::Rejected { attempts_remaining } => {
                Err(AuthError::Rejected { attempts_remaining })
            }
            LoginOutcome::Locked => Err(AuthError::Locked),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password ({attempts_remaining} attempt(s) remaining)")]
    Rejected { attempts_remaining: u32 },

    #[error("too many failed login attempts; start a new session")]
    Locked,
}

pub struct AuthGate<T> {
    registry: Arc<CredentialRegistry>,
    issued: T,
    policy: GatePolicy,
}

impl<T> AuthGate<T>
where
    T: IssuedTokens,
{
    pub fn new(registry: Arc<CredentialRegistry>, issued: T, mut policy: GatePolicy) -> Self {
        policy.max_attempts = policy.max_attempts.max(1);
        if policy.remember_mode == RememberMode::IdentityOnly {
            warn!("remember-me runs in identity-only mode: client-held usernames are trusted without a secret");
        }
        Self {
            registry,
            issued,
            policy,
        }
    }

    /// Resolve whether the session may proceed.
    ///
    /// An unauthenticated (not locked) session is resumed from a valid
    /// remember-me value if the client holds one. Unusable values are deleted
    /// from the client store.
    pub fn check(
        &self,
        session: &mut Session,
        client: &mut dyn RememberStore,
        now: DateTime<Utc>,
    ) -> AccessCheck {
        session.touch(now);
        if let Some(identity) = session.identity() {
            return AccessCheck::granted(identity.clone());
        }
        if session.state().is_locked() {
            return AccessCheck::denied();
        }

        match self.resume(client, now) {
            Some((identity, token)) => {
                info!(session_id = %session.id(), identity = %identity, "session resumed from remember-me token");
                session.set_state(GateState::Authenticated {
                    identity: identity.clone(),
                });
                session.set_issued_token(token);
                AccessCheck::granted(identity)
            }
            None => AccessCheck::denied(),
        }
    }

    /// Submit credentials.
    ///
    /// A locked session rejects every submission, including correct ones. A
    /// submission on an already authenticated session changes nothing; log out
    /// first to switch identity.
    pub fn login(
        &self,
        session: &mut Session,
        credentials: &Credentials,
        remember: bool,
        client: &mut dyn RememberStore,
        now: DateTime<Utc>,
    ) -> LoginOutcome {
        session.touch(now);
        let attempts = match session.state() {
            GateState::Locked => {
                warn!(session_id = %session.id(), username = credentials.username(), "login refused: session is locked");
                return LoginOutcome::Locked;
            }
            GateState::Authenticated { identity } => return LoginOutcome::Granted(identity.clone()),
            GateState::Unauthenticated { attempts } => *attempts,
        };

        match self.registry.verify(credentials) {
            Some(identity) => {
                session.set_state(GateState::Authenticated {
                    identity: identity.clone(),
                });
                if remember {
                    self.persist(session, &identity, client, now);
                }
                info!(session_id = %session.id(), identity = %identity, remember, "login succeeded");
                LoginOutcome::Granted(identity)
            }
            None => {
                let attempts = attempts.saturating_add(1);
                if attempts >= self.policy.max_attempts {
                    session.set_state(GateState::Locked);
                    warn!(session_id = %session.id(), username = credentials.username(), attempts, "session locked after repeated login failures");
                    LoginOutcome::Locked
                } else {
                    session.set_state(GateState::Unauthenticated { attempts });
                    let attempts_remaining = self.policy.max_attempts - attempts;
                    info!(session_id = %session.id(), username = credentials.username(), attempts, "login rejected");
                    LoginOutcome::Rejected { attempts_remaining }
                }
            }
        }
    }

    /// End an authenticated session and forget any remember-me token.
    ///
    /// Failed-attempt counters and a lock survive logout.
    pub fn logout(&self, session: &mut Session, client: &mut dyn RememberStore) {
        if let Some(token) = session.issued_token() {
            self.issued.revoke(token);
        }
        if let Some(token) = client
            .get(REMEMBER_KEY)
            .and_then(|v| v.parse::<RememberTokenId>().ok())
        {
            self.issued.revoke(token);
        }
        client.delete(REMEMBER_KEY);
        session.set_issued_token(None);

        if let Some(identity) = session.identity().cloned() {
            info!(session_id = %session.id(), identity = %identity, "logged out");
            session.set_state(GateState::Unauthenticated { attempts: 0 });
        }
    }

    fn persist(
        &self,
        session: &mut Session,
        identity: &Identity,
        client: &mut dyn RememberStore,
        now: DateTime<Utc>,
    ) {
        let expires_at = now + self.policy.remember_ttl;
        let value = match self.policy.remember_mode {
            RememberMode::Verified => {
                let claims = RememberClaims::issue(identity.clone(), now, self.policy.remember_ttl);
                let token_id = claims.token_id;
                self.issued.insert(claims);
                session.set_issued_token(Some(token_id));
                token_id.to_string()
            }
            RememberMode::IdentityOnly => identity.to_string(),
        };
        client.set(REMEMBER_KEY, value, expires_at);
    }

    fn resume(
        &self,
        client: &mut dyn RememberStore,
        now: DateTime<Utc>,
    ) -> Option<(Identity, Option<RememberTokenId>)> {
        let value = client.get(REMEMBER_KEY)?;
        let resolved = match self.policy.remember_mode {
            RememberMode::Verified => self
                .resolve_issued(&value, now)
                .map(|(identity, token)| (identity, Some(token))),
            RememberMode::IdentityOnly => self
                .registry
                .contains(&value)
                .then(|| (Identity::new(value.clone()), None)),
        };
        if resolved.is_none() {
            debug!("discarding unusable remember-me value");
            client.delete(REMEMBER_KEY);
        }
        resolved
    }

    fn resolve_issued(
        &self,
        value: &str,
        now: DateTime<Utc>,
    ) -> Option<(Identity, RememberTokenId)> {
        let token_id: RememberTokenId = value.parse().ok()?;
        let claims = self.issued.lookup(token_id)?;
        if let Err(e) = validate_claims(&claims, now) {
            debug!(error = %e, "remember-me token rejected");
            self.issued.revoke(token_id);
            return None;
        }
        if !self.registry.contains(claims.identity.as_str()) {
            warn!(identity = %claims.identity, "remember-me token names an unregistered identity");
            self.issued.revoke(token_id);
            return None;
        }
        Some((claims.identity, token_id))
    }
}
