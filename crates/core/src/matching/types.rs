//! Match specification and match location types.

use serde::{Deserialize, Serialize};

/// String comparison semantics a search request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Matches anything non-null, spanning the whole candidate.
    Any,
    Null,
    NonNull,
    /// Non-null and entirely whitespace (or empty).
    Blank,
    NonBlank,
    Empty,
    NonEmpty,
    NullOrBlank,
    NullOrEmpty,
    /// Substring match, repeated and non-overlapping.
    #[default]
    Contains,
    Equals,
    NotEquals,
    StartsWith,
    EndsWith,
    Regex,
    /// Pattern characters appear in order, anywhere in the candidate.
    CharsAnywhere,
}

impl MatchType {
    /// All match types, in declaration order.
    pub const ALL: [MatchType; 16] = [
        Self::Any,
        Self::Null,
        Self::NonNull,
        Self::Blank,
        Self::NonBlank,
        Self::Empty,
        Self::NonEmpty,
        Self::NullOrBlank,
        Self::NullOrEmpty,
        Self::Contains,
        Self::Equals,
        Self::NotEquals,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regex,
        Self::CharsAnywhere,
    ];

    /// Parse from the snake_case name used in config and on the command line.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "any" => Some(Self::Any),
            "null" => Some(Self::Null),
            "non_null" => Some(Self::NonNull),
            "blank" => Some(Self::Blank),
            "non_blank" => Some(Self::NonBlank),
            "empty" => Some(Self::Empty),
            "non_empty" => Some(Self::NonEmpty),
            "null_or_blank" => Some(Self::NullOrBlank),
            "null_or_empty" => Some(Self::NullOrEmpty),
            "contains" => Some(Self::Contains),
            "equals" => Some(Self::Equals),
            "not_equals" => Some(Self::NotEquals),
            "starts_with" => Some(Self::StartsWith),
            "ends_with" => Some(Self::EndsWith),
            "regex" => Some(Self::Regex),
            "chars_anywhere" => Some(Self::CharsAnywhere),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::NonNull => "non_null",
            Self::Blank => "blank",
            Self::NonBlank => "non_blank",
            Self::Empty => "empty",
            Self::NonEmpty => "non_empty",
            Self::NullOrBlank => "null_or_blank",
            Self::NullOrEmpty => "null_or_empty",
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Regex => "regex",
            Self::CharsAnywhere => "chars_anywhere",
        }
    }

    /// True for the predicate family that reports a zero-length location.
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Self::Null
                | Self::NonNull
                | Self::Blank
                | Self::NonBlank
                | Self::Empty
                | Self::NonEmpty
                | Self::NullOrBlank
                | Self::NullOrEmpty
        )
    }
}

/// What to match and how.
///
/// `pattern` may embed `tag:<value>` tokens; see [`super::tags::TagFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MatchSpec {
    pub match_type: MatchType,
    pub pattern: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl MatchSpec {
    pub fn new(match_type: MatchType, pattern: impl Into<String>) -> Self {
        Self { match_type, pattern: pattern.into(), case_sensitive: false }
    }

    pub fn contains(pattern: impl Into<String>) -> Self {
        Self::new(MatchType::Contains, pattern)
    }

    pub fn equals(pattern: impl Into<String>) -> Self {
        Self::new(MatchType::Equals, pattern)
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new(MatchType::Regex, pattern)
    }

    pub fn chars_anywhere(pattern: impl Into<String>) -> Self {
        Self::new(MatchType::CharsAnywhere, pattern)
    }

    pub fn any() -> Self {
        Self::new(MatchType::Any, "")
    }

    /// Set case sensitivity.
    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }
}

/// A half-open byte span into a candidate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchLocation {
    pub offset: usize,
    pub length: usize,
}

impl MatchLocation {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The matched slice of `text`, if the span lies inside it.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.offset..self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_round_trips_names() {
        for match_type in MatchType::ALL {
            assert_eq!(MatchType::from_str(match_type.as_str()), Some(match_type));
        }
        assert_eq!(MatchType::from_str("Starts-With"), Some(MatchType::StartsWith));
        assert_eq!(MatchType::from_str("fuzzy"), None);
    }

    #[test]
    fn test_predicate_family() {
        assert!(MatchType::NullOrBlank.is_predicate());
        assert!(!MatchType::Any.is_predicate());
        assert!(!MatchType::Contains.is_predicate());
    }

    #[test]
    fn test_location_slice() {
        let loc = MatchLocation::new(4, 5);
        assert_eq!(loc.end(), 9);
        assert_eq!(loc.slice("The quick brown fox"), Some("quick"));
        assert_eq!(MatchLocation::new(10, 5).slice("short"), None);
    }
}
