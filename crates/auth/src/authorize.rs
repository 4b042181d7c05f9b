use std::collections::HashMap;

use thiserror::Error;

use crate::{Capability, CapabilitySet, Identity, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: '{identity}' lacks capability '{capability}'")]
    Forbidden {
        identity: String,
        capability: Capability,
    },
}

/// Identity → capability mapping.
///
/// Without explicit grants the policy reproduces the two-tier model:
/// `admin` may do everything, every other identity may only write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityPolicy {
    grants: HashMap<Identity, CapabilitySet>,
    default_grant: CapabilitySet,
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        let mut grants = HashMap::new();
        grants.insert(Identity::new(Identity::ADMIN), CapabilitySet::ALL);
        Self {
            grants,
            default_grant: CapabilitySet::WRITER,
        }
    }
}

impl CapabilityPolicy {
    /// Override the capabilities of one identity.
    pub fn grant(mut self, identity: Identity, capabilities: CapabilitySet) -> Self {
        self.grants.insert(identity, capabilities);
        self
    }

    pub fn capabilities_for(&self, identity: &Identity) -> CapabilitySet {
        self.grants
            .get(identity)
            .copied()
            .unwrap_or(self.default_grant)
    }

    pub fn resolve(&self, identity: Identity) -> Principal {
        let capabilities = self.capabilities_for(&identity);
        Principal::new(identity, capabilities)
    }
}

/// Authorize a principal for one capability.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, required: Capability) -> Result<(), AuthzError> {
    if principal.capabilities.allows(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            identity: principal.identity.to_string(),
            capability: required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_two_tier() {
        let policy = CapabilityPolicy::default();

        let admin = policy.resolve(Identity::new("admin"));
        assert!(authorize(&admin, Capability::WriteLedger).is_ok());
        assert!(authorize(&admin, Capability::ViewReport).is_ok());

        let assistant = policy.resolve(Identity::new("assistant"));
        assert!(authorize(&assistant, Capability::WriteLedger).is_ok());
        assert_eq!(
            authorize(&assistant, Capability::ViewReport),
            Err(AuthzError::Forbidden {
                identity: "assistant".to_string(),
                capability: Capability::ViewReport,
            })
        );
    }

    #[test]
    fn explicit_grant_overrides_default() {
        let policy = CapabilityPolicy::default().grant(
            Identity::new("auditor"),
            [Capability::ViewReport].into_iter().collect(),
        );

        let auditor = policy.resolve(Identity::new("auditor"));
        assert!(authorize(&auditor, Capability::ViewReport).is_ok());
        assert!(authorize(&auditor, Capability::WriteLedger).is_err());
    }
}
