//! Request and response types of the engine operations.

use serde::{Deserialize, Serialize};

use crate::content::ContentRef;
use crate::matching::{MatchLocation, MatchSpec};

/// Characters of context kept around the first match in a sample.
pub const SAMPLE_LENGTH: usize = 100;

pub const DEFAULT_PAGE_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_page_length")]
    pub length: usize,
}

impl PageRequest {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Whether the `index`-th qualifying hit falls inside this page.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.offset && index - self.offset < self.length
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { offset: 0, length: DEFAULT_PAGE_LENGTH }
    }
}

fn default_page_length() -> usize {
    DEFAULT_PAGE_LENGTH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    pub offset: usize,
    /// Number of values returned.
    pub length: usize,
    /// Number of qualifying hits across all pages.
    pub total: usize,
    /// True when nothing qualifies beyond this page.
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage<T> {
    pub values: Vec<T>,
    pub page: PageResponse,
}

impl<T> ResultPage<T> {
    pub fn new(values: Vec<T>, offset: usize, total: usize) -> Self {
        let length = values.len();
        Self {
            values,
            page: PageResponse { offset, length, total, exact: total == offset + length },
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindInContentRequest {
    pub filter: MatchSpec,
    /// Required tags in addition to any `tag:` tokens in the pattern.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub page: PageRequest,
}

impl FindInContentRequest {
    pub fn new(filter: MatchSpec) -> Self {
        Self { filter, ..Default::default() }
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_page(mut self, offset: usize, length: usize) -> Self {
        self.page = PageRequest::new(offset, length);
        self
    }
}

/// One matching item extension with a sample around its first match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMatch {
    pub content: ContentRef,
    pub extension: String,
    /// First match in the full text.
    pub location: MatchLocation,
    pub sample: String,
    /// The match relative to `sample`, possibly truncated.
    pub sample_location: MatchLocation,
    pub tags: Vec<String>,
}

impl ContentMatch {
    pub fn new(
        content: ContentRef,
        extension: String,
        text: &str,
        location: MatchLocation,
        tags: Vec<String>,
    ) -> Self {
        let (sample, sample_location) = sample(text, location);
        Self { content, extension, location, sample, sample_location, tags }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchHighlightsRequest {
    pub content: ContentRef,
    pub extension: String,
    pub filter: MatchSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentHighlights {
    pub content: ContentRef,
    pub extension: String,
    pub text: String,
    pub highlights: Vec<MatchLocation>,
}

/// Cut a window of `text` around `location`.
///
/// Keeps up to half of [`SAMPLE_LENGTH`] characters on each side of the
/// match, and at most [`SAMPLE_LENGTH`] characters of the match itself.
fn sample(text: &str, location: MatchLocation) -> (String, MatchLocation) {
    let half = SAMPLE_LENGTH / 2;
    let offset = location.offset.min(text.len());
    let match_end = location.end().min(chars_forward(text, offset, SAMPLE_LENGTH));
    let start = chars_back(text, offset, half);
    let end = chars_forward(text, match_end, half);

    let sample = text.get(start..end).unwrap_or_default().to_string();
    (sample, MatchLocation::new(offset - start, match_end - offset))
}

fn chars_back(text: &str, from: usize, n: usize) -> usize {
    if n == 0 {
        return from;
    }
    text.get(..from)
        .and_then(|head| head.char_indices().rev().nth(n - 1))
        .map_or(0, |(i, _)| i)
}

fn chars_forward(text: &str, from: usize, n: usize) -> usize {
    text.get(from..)
        .and_then(|tail| tail.char_indices().nth(n))
        .map_or(text.len(), |(i, _)| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window() {
        let page = PageRequest::new(2, 3);
        assert!(!page.contains(1));
        assert!(page.contains(2));
        assert!(page.contains(4));
        assert!(!page.contains(5));
    }

    #[test]
    fn test_result_page_exactness() {
        let page = ResultPage::new(vec![1, 2], 4, 6);
        assert!(page.page.exact);
        assert_eq!(page.page.length, 2);

        let page = ResultPage::new(vec![1, 2], 0, 6);
        assert!(!page.page.exact);

        let empty = ResultPage::<u8>::empty();
        assert!(empty.page.exact);
        assert_eq!(empty.page.total, 0);
    }

    #[test]
    fn test_short_text_sample_is_whole_text() {
        let text = "The quick brown fox";
        let (sample, loc) = sample(text, MatchLocation::new(4, 5));
        assert_eq!(sample, text);
        assert_eq!(loc, MatchLocation::new(4, 5));
    }

    #[test]
    fn test_sample_trims_long_context() {
        let text = format!("{}needle{}", "a".repeat(200), "b".repeat(200));
        let (sample, loc) = sample(&text, MatchLocation::new(200, 6));
        assert_eq!(sample.len(), 50 + 6 + 50);
        assert_eq!(loc.slice(&sample), Some("needle"));
    }

    #[test]
    fn test_sample_truncates_long_match() {
        let text = "x".repeat(500);
        let (sample, loc) = sample(&text, MatchLocation::new(0, 500));
        assert_eq!(loc, MatchLocation::new(0, SAMPLE_LENGTH));
        assert_eq!(sample.len(), SAMPLE_LENGTH + SAMPLE_LENGTH / 2);
    }

    #[test]
    fn test_sample_respects_char_boundaries() {
        let text = format!("{}é{}", "é".repeat(80), "ü".repeat(80));
        let offset = "é".len() * 80;
        let (sample, loc) = sample(&text, MatchLocation::new(offset, "é".len()));
        assert_eq!(sample.chars().count(), 101);
        assert_eq!(loc.slice(&sample), Some("é"));
    }

    #[test]
    fn test_request_defaults() {
        let request: FindInContentRequest =
            serde_json::from_str(r#"{"filter":{"match_type":"regex","pattern":"a+"}}"#).unwrap();
        assert_eq!(request.page, PageRequest::default());
        assert!(!request.filter.case_sensitive);
        assert!(request.tags.is_empty());
    }
}
