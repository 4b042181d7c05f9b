use holdbook_auth::Principal;
use holdbook_core::SessionId;

/// Session addressed by the request's bearer token.
///
/// Only proves the session exists; whether it is authenticated is decided per
/// route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: SessionId,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

/// Authenticated principal of the request, resolved against the capability
/// policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    session_id: SessionId,
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(session_id: SessionId, principal: Principal) -> Self {
        Self {
            session_id,
            principal,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
