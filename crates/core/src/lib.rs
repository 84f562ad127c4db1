//! Content indexing and matching engine.
//!
//! Items from pluggable [`content::ContentProvider`]s are indexed as
//! character n-grams, searched with one of several [`matching::MatchType`]
//! semantics, filtered by viewer permission and returned with highlight
//! spans.

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod index;
pub mod matching;

pub use engine::ContentIndexEngine;
pub use error::{BootstrapError, ContentIndexError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
