use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use holdbook_accounting::LedgerEntry;

/// Parsed ledger content as of one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub entries: Vec<LedgerEntry>,
    /// Rows that could not be parsed and were left out of `entries`.
    pub skipped: usize,
}

impl LedgerSnapshot {
    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> &[LedgerEntry] {
        let start = self.entries.len().saturating_sub(limit);
        &self.entries[start..]
    }
}

/// Read cache shared by the writer (which invalidates) and the reader (which
/// fills).
///
/// Every invalidation bumps a generation counter; a fill only lands if no
/// invalidation happened since the read started, so a write racing a read can
/// never leave a stale snapshot cached.
#[derive(Debug, Default)]
pub struct LedgerCache {
    slot: RwLock<Option<Arc<LedgerSnapshot>>>,
    generation: AtomicU64,
}

impl LedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<LedgerSnapshot>> {
        self.slot.read().ok()?.clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `snapshot` if the cache was not invalidated after `generation`.
    pub fn fill(&self, generation: u64, snapshot: Arc<LedgerSnapshot>) {
        if let Ok(mut slot) = self.slot.write() {
            if self.generation.load(Ordering::Acquire) == generation {
                *slot = Some(snapshot);
            }
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.write() {
            self.generation.fetch_add(1, Ordering::AcqRel);
            *slot = None;
        }
    }
}
