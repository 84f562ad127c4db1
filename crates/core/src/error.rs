//! Errors surfaced by the public engine operations.

use std::sync::Arc;

use thiserror::Error;

use crate::content::ContentRef;
use crate::index::{BuilderError, StoreError};

/// Why bootstrap did not reach the ready state.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to open index: {0}")]
    Store(#[from] StoreError),

    #[error("initial indexing failed: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to start index thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("shut down before the index was ready")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum ContentIndexError {
    /// Bootstrap failed; permanent for this engine.
    #[error("content index unavailable: {0}")]
    Unavailable(#[source] Arc<BootstrapError>),

    /// Bootstrap still running; retry later.
    #[error("content index is still being built ({percent_complete}% complete)")]
    NotReady { percent_complete: u8 },

    #[error("permission denied to view {0}")]
    PermissionDenied(ContentRef),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Build(#[from] BuilderError),
}

impl ContentIndexError {
    /// True when the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }
}
