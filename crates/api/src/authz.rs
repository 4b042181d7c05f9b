//! API-side authorization guard.
//!
//! Resolves the session's identity into a principal and checks one capability
//! before any handler work runs; the ledger and report layers stay
//! auth-agnostic.

use chrono::Utc;
use tracing::warn;

use holdbook_auth::{Capability, authorize};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, SessionContext};

/// Require an authenticated session holding `capability`.
pub fn require(
    services: &AppServices,
    session: &SessionContext,
    capability: Capability,
) -> Result<PrincipalContext, ApiError> {
    let identity = services
        .sessions
        .get(session.session_id(), Utc::now())
        .ok_or(ApiError::SessionExpired)?
        .identity()
        .cloned()
        .ok_or(ApiError::NotAuthenticated)?;

    let principal = services.capabilities.resolve(identity);
    if let Err(err) = authorize(&principal, capability) {
        warn!(
            session_id = %session.session_id(),
            identity = %principal.identity,
            capability = %capability,
            "request refused"
        );
        return Err(err.into());
    }

    Ok(PrincipalContext::new(session.session_id(), principal))
}
