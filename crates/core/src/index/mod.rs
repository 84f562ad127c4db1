//! Content index for find-in-content queries.
//!
//! This module provides tantivy-based indexing for:
//! - Body text of every content item extension, as case-sensitive and
//!   case-insensitive character n-grams plus one raw term for regexes
//! - Item identity (type, uuid, name, extension) and tags
//!
//! # Example
//!
//! ```no_run
//! use docfind_core::index::{IndexStore, QueryBuilder};
//! use docfind_core::matching::MatchSpec;
//! use std::path::Path;
//!
//! let store = IndexStore::open(Path::new("/tmp/docfind-index"), 50_000_000).unwrap();
//! let query = QueryBuilder::new(&store, 1_000_000)
//!     .build_search_query(&MatchSpec::contains("quick"), &[])
//!     .unwrap();
//! ```

pub mod builder;
pub mod document;
pub mod lifecycle;
pub mod query;
pub mod schema;
pub mod store;
pub mod types;

pub use builder::{BuilderError, IndexBuilder};
pub use document::{StoredDocument, build_document};
pub use lifecycle::IndexLifecycle;
pub use query::{QueryBuilder, QueryError};
pub use schema::ContentFields;
pub use store::{IndexStore, StoreError};
pub use types::{BatchProgress, IndexState, IndexStats, IndexStatus};
