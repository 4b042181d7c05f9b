//! `holdbook-auth`: authentication gate and authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: sessions and
//! client stores are handed in by the caller.

pub mod authorize;
pub mod capabilities;
pub mod claims;
pub mod credentials;
pub mod gate;
pub mod identity;
pub mod principal;
pub mod remember;
pub mod session;

pub use authorize::{AuthzError, CapabilityPolicy, authorize};
pub use capabilities::{Capability, CapabilitySet};
pub use claims::{RememberClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialRegistry, Credentials};
pub use gate::{AccessCheck, AuthError, AuthGate, GatePolicy, LoginOutcome};
pub use identity::Identity;
pub use principal::Principal;
pub use remember::{
    InMemoryIssuedTokens, InMemoryRememberStore, IssuedTokens, REMEMBER_KEY, RememberMode,
    RememberStore,
};
pub use session::{GateState, Session};
