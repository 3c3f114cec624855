//! Shared application state: the local snapshot of the remote collection.
//!
//! The snapshot has exactly one writer role (the change-feed listener, or
//! the one-shot reload that stands in for it) and many readers. Readers get
//! a cloned `Vec`, so a replacement is atomic from their point of view and
//! no reader can observe a half-replaced snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::types::{CustomerRecord, SalesTargets};

pub struct AppState {
    targets: SalesTargets,
    snapshot: RwLock<Vec<CustomerRecord>>,
    /// Highest sequence number seen across all pushed snapshots. Keeps
    /// locally-generated sequence numbers monotonic even when another
    /// client wrote last.
    max_seq: AtomicU64,
}

impl AppState {
    pub fn new(targets: SalesTargets) -> Self {
        Self {
            targets,
            snapshot: RwLock::new(Vec::new()),
            max_seq: AtomicU64::new(0),
        }
    }

    pub fn targets(&self) -> &SalesTargets {
        &self.targets
    }

    /// Current snapshot contents, cloned under the read lock.
    pub fn snapshot(&self) -> Vec<CustomerRecord> {
        self.snapshot.read().clone()
    }

    /// Replace the snapshot wholesale with pushed collection contents.
    ///
    /// Replacement, not merge: afterwards the snapshot holds exactly the
    /// pushed records. Also advances the sequence counter past anything
    /// the push carries.
    pub fn replace_snapshot(&self, records: Vec<CustomerRecord>) {
        let pushed_max = records.iter().filter_map(|r| r.seq).max().unwrap_or(0);
        self.max_seq.fetch_max(pushed_max, Ordering::SeqCst);
        *self.snapshot.write() = records;
    }

    /// Allocate the next local sequence number.
    pub fn next_seq(&self) -> u64 {
        self.max_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Look up a record by store-assigned id.
    pub fn find(&self, id: &str) -> Option<CustomerRecord> {
        self.snapshot.read().iter().find(|c| c.id == id).cloned()
    }
}
