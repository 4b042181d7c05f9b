use serde::Serialize;

use crate::{CapabilitySet, Identity};

/// A fully resolved principal for authorization decisions.
///
/// Built once the gate has granted access; carries nothing mutable from the
/// session it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub identity: Identity,
    pub capabilities: CapabilitySet,
}

impl Principal {
    pub fn new(identity: Identity, capabilities: CapabilitySet) -> Self {
        Self {
            identity,
            capabilities,
        }
    }
}
