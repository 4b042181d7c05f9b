use serde::{Deserialize, Serialize};

use holdbook_core::{DomainError, ValueObject};

/// A single thing an identity may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Append simple entries and transfers to the ledger.
    WriteLedger,
    /// See the report snapshot, the ledger summary and recent activity.
    ViewReport,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::WriteLedger, Capability::ViewReport];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::WriteLedger => "write_ledger",
            Capability::ViewReport => "view_report",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Capability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "write_ledger" | "write" => Ok(Capability::WriteLedger),
            "view_report" | "report" => Ok(Capability::ViewReport),
            other => Err(DomainError::validation(format!("unknown capability '{other}'"))),
        }
    }
}

/// Capabilities granted to one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub can_write: bool,
    pub can_view_report: bool,
}

impl ValueObject for CapabilitySet {}

impl CapabilitySet {
    pub const NONE: CapabilitySet = CapabilitySet {
        can_write: false,
        can_view_report: false,
    };

    pub const WRITER: CapabilitySet = CapabilitySet {
        can_write: true,
        can_view_report: false,
    };

    pub const ALL: CapabilitySet = CapabilitySet {
        can_write: true,
        can_view_report: true,
    };

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::WriteLedger => self.can_write,
            Capability::ViewReport => self.can_view_report,
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        match capability {
            Capability::WriteLedger => self.can_write = true,
            Capability::ViewReport => self.can_view_report = true,
        }
        self
    }

    /// Granted capabilities in declaration order (for display).
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(CapabilitySet::NONE, CapabilitySet::with)
    }
}
