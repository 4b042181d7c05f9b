use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Authenticated identity.
///
/// The username doubles as the role: authorization tiers are looked up by
/// identity in the [`CapabilityPolicy`](crate::CapabilityPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Cow<'static, str>);

impl Identity {
    /// The distinguished identity that is granted every capability by default.
    pub const ADMIN: &'static str = "admin";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Identity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}
