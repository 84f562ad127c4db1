//! Index state, statistics and progress types.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Bootstrap state of an index lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl IndexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from applying one batch of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of events in the batch.
    pub events: usize,
    /// Events fully applied before the batch ended.
    pub processed: usize,
    /// Documents written, one per extension.
    pub documents_added: usize,
    /// Items skipped because their provider failed.
    pub documents_skipped: usize,
    /// Items whose existing documents were deleted.
    pub deletes: usize,
    /// True when the batch was rolled back on shutdown.
    pub cancelled: bool,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Point-in-time view of an index for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub state: IndexState,
    pub percent_complete: u8,
    pub document_count: u64,
}

/// Progress of the batch currently being applied.
#[derive(Debug, Default)]
pub struct BatchProgress {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl BatchProgress {
    pub fn start(&self, total: usize) {
        self.done.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    pub fn advance(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    /// Whole percent of the batch applied; 0 before any batch starts.
    pub fn percent(&self) -> u8 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0;
        }
        let done = self.done.load(Ordering::Relaxed).min(total);
        (done * 100 / total) as u8
    }
}
