//! Per-connection session state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use holdbook_core::{RememberTokenId, SessionId};

use crate::Identity;

/// Gate state of one session.
///
/// ```text
/// Unauthenticated(n) --valid credentials / token--> Authenticated(id)
/// Unauthenticated(n) --bad credentials, n+1 < max--> Unauthenticated(n+1)
/// Unauthenticated(n) --bad credentials, n+1 >= max--> Locked
/// Authenticated(id)  --logout--> Unauthenticated(0)
/// Locked             --(terminal; only a new session leaves it)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    Unauthenticated { attempts: u32 },
    Locked,
    Authenticated { identity: Identity },
}

impl Default for GateState {
    fn default() -> Self {
        GateState::Unauthenticated { attempts: 0 }
    }
}

impl GateState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            GateState::Authenticated { identity } => Some(identity),
            _ => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, GateState::Locked)
    }
}

/// Session context passed through request handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    state: GateState,
    /// Token issued by a "remember me" login during this session.
    issued_token: Option<RememberTokenId>,
    last_seen: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            state: GateState::default(),
            issued_token: None,
            last_seen: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity()
    }

    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub(crate) fn set_state(&mut self, state: GateState) {
        self.state = state;
    }

    pub(crate) fn issued_token(&self) -> Option<RememberTokenId> {
        self.issued_token
    }

    pub(crate) fn set_issued_token(&mut self, token: Option<RememberTokenId>) {
        self.issued_token = token;
    }
}
