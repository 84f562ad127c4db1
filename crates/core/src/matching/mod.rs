//! String matching: match types, tag filters and highlighting.
//!
//! Everything here is pure and works on in-memory strings; the index layer
//! uses it to verify candidate hits and compute highlight spans.

pub mod fold;
pub mod highlight;
pub mod matcher;
pub mod tags;
pub mod types;

pub use highlight::Highlighter;
pub use matcher::{MatchError, StringMatcher};
pub use tags::TagFilter;
pub use types::{MatchLocation, MatchSpec, MatchType};
