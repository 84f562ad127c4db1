//! Match-type semantics over a single candidate string.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use super::fold::{Folded, fold};
use super::tags::TagFilter;
use super::types::{MatchLocation, MatchSpec, MatchType};

/// Compiled regex size ceiling for matcher patterns.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

#[derive(Debug, Clone, Error)]
pub enum MatchError {
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Evaluates one [`MatchSpec`] against candidate strings.
///
/// Regex and chars-anywhere patterns are compiled on first use and cached.
#[derive(Debug)]
pub struct StringMatcher {
    match_type: MatchType,
    case_sensitive: bool,
    /// Pattern text with tag tokens removed.
    text: String,
    /// `text` folded when matching case-insensitively.
    normalized: String,
    regex: OnceLock<Result<Regex, MatchError>>,
}

impl StringMatcher {
    pub fn new(spec: &MatchSpec) -> Self {
        let filter = TagFilter::parse(&spec.pattern);
        let text = match spec.match_type {
            MatchType::Regex => strip_regex_slashes(&filter.text).to_string(),
            _ => filter.text,
        };
        let normalized = if spec.case_sensitive { text.clone() } else { fold(&text) };

        Self {
            match_type: spec.match_type,
            case_sensitive: spec.case_sensitive,
            text,
            normalized,
            regex: OnceLock::new(),
        }
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// The pattern text this matcher compares against.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// First match location, if any.
    pub fn first(&self, candidate: Option<&str>) -> Result<Option<MatchLocation>, MatchError> {
        Ok(self.matches(candidate, 1)?.into_iter().next())
    }

    /// Up to `limit` match locations in `candidate`.
    pub fn matches(
        &self,
        candidate: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MatchLocation>, MatchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        if self.match_type.is_predicate() {
            return Ok(if self.predicate(candidate) {
                vec![MatchLocation::new(0, 0)]
            } else {
                Vec::new()
            });
        }

        let Some(candidate) = candidate else {
            return Ok(Vec::new());
        };

        let locations = match self.match_type {
            MatchType::Any => vec![MatchLocation::new(0, candidate.len())],
            MatchType::Equals => self.whole_if(candidate, true),
            MatchType::NotEquals => self.whole_if(candidate, false),
            MatchType::Contains => self.contains(candidate, limit),
            MatchType::StartsWith => self.starts_with(candidate),
            MatchType::EndsWith => self.ends_with(candidate),
            MatchType::Regex | MatchType::CharsAnywhere => self
                .compiled()?
                .find_iter(candidate)
                .take(limit)
                .map(|m| MatchLocation::new(m.start(), m.len()))
                .collect(),
            MatchType::Null
            | MatchType::NonNull
            | MatchType::Blank
            | MatchType::NonBlank
            | MatchType::Empty
            | MatchType::NonEmpty
            | MatchType::NullOrBlank
            | MatchType::NullOrEmpty => Vec::new(),
        };

        Ok(locations)
    }

    fn predicate(&self, candidate: Option<&str>) -> bool {
        let blank = |s: &str| s.chars().all(char::is_whitespace);
        match self.match_type {
            MatchType::Null => candidate.is_none(),
            MatchType::NonNull => candidate.is_some(),
            MatchType::Blank => candidate.is_some_and(blank),
            MatchType::NonBlank => candidate.is_some_and(|s| !blank(s)),
            MatchType::Empty => candidate.is_some_and(str::is_empty),
            MatchType::NonEmpty => candidate.is_some_and(|s| !s.is_empty()),
            MatchType::NullOrBlank => candidate.is_none_or(blank),
            MatchType::NullOrEmpty => candidate.is_none_or(str::is_empty),
            _ => false,
        }
    }

    fn whole_if(&self, candidate: &str, want_equal: bool) -> Vec<MatchLocation> {
        let equal = if self.case_sensitive {
            candidate == self.normalized
        } else {
            fold(candidate) == self.normalized
        };
        if equal == want_equal {
            vec![MatchLocation::new(0, candidate.len())]
        } else {
            Vec::new()
        }
    }

    fn contains(&self, candidate: &str, limit: usize) -> Vec<MatchLocation> {
        let needle = self.normalized.as_str();
        if needle.is_empty() {
            return vec![MatchLocation::new(0, 0)];
        }

        let folded = (!self.case_sensitive).then(|| Folded::new(candidate));
        let haystack = folded.as_ref().map_or(candidate, Folded::as_str);

        let mut locations = Vec::new();
        let mut from = 0;
        while locations.len() < limit {
            let Some(found) = haystack[from..].find(needle) else {
                break;
            };
            let start = from + found;
            let end = start + needle.len();
            locations.push(span(folded.as_ref(), start, end));
            from = end;
        }
        locations
    }

    fn starts_with(&self, candidate: &str) -> Vec<MatchLocation> {
        let folded = (!self.case_sensitive).then(|| Folded::new(candidate));
        let haystack = folded.as_ref().map_or(candidate, Folded::as_str);
        if haystack.starts_with(self.normalized.as_str()) {
            vec![span(folded.as_ref(), 0, self.normalized.len())]
        } else {
            Vec::new()
        }
    }

    fn ends_with(&self, candidate: &str) -> Vec<MatchLocation> {
        let folded = (!self.case_sensitive).then(|| Folded::new(candidate));
        let haystack = folded.as_ref().map_or(candidate, Folded::as_str);
        if haystack.ends_with(self.normalized.as_str()) {
            let start = haystack.len() - self.normalized.len();
            vec![span(folded.as_ref(), start, haystack.len())]
        } else {
            Vec::new()
        }
    }

    fn compiled(&self) -> Result<&Regex, MatchError> {
        self.regex
            .get_or_init(|| {
                let pattern = match self.match_type {
                    MatchType::CharsAnywhere => chars_anywhere_pattern(&self.text),
                    _ => self.text.clone(),
                };
                RegexBuilder::new(&pattern)
                    .case_insensitive(!self.case_sensitive)
                    .dot_matches_new_line(true)
                    .size_limit(REGEX_SIZE_LIMIT)
                    .build()
                    .map_err(|source| MatchError::InvalidRegex { pattern, source })
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn span(folded: Option<&Folded>, start: usize, end: usize) -> MatchLocation {
    let (start, end) = folded.map_or((start, end), |f| f.original_span(start, end));
    MatchLocation::new(start, end - start)
}

/// `abc` becomes `.*a.*b.*c.*`, each character escaped.
pub fn chars_anywhere_pattern(text: &str) -> String {
    let mut pattern = String::from(".*");
    for ch in text.chars() {
        pattern.push_str(&regex::escape(ch.encode_utf8(&mut [0; 4])));
        pattern.push_str(".*");
    }
    pattern
}

/// `/abc/` becomes `abc`; anything else is returned unchanged.
pub fn strip_regex_slashes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('/') && text.ends_with('/') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}
