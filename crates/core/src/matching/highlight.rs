//! Highlight spans inside matched document text.

use super::matcher::{MatchError, StringMatcher};
use super::types::{MatchLocation, MatchSpec};

/// Finds up to a fixed number of highlight locations in full document text.
#[derive(Debug)]
pub struct Highlighter {
    matcher: StringMatcher,
}

impl Highlighter {
    pub fn new(spec: &MatchSpec) -> Self {
        Self { matcher: StringMatcher::new(spec) }
    }

    pub fn highlight(&self, text: &str, max: usize) -> Result<Vec<MatchLocation>, MatchError> {
        self.matcher.matches(Some(text), max)
    }

    /// First highlight location, used to decide whether a hit qualifies.
    pub fn first(&self, text: &str) -> Result<Option<MatchLocation>, MatchError> {
        self.matcher.first(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_quick_brown_fox() {
        let highlighter = Highlighter::new(&MatchSpec::contains("quick"));
        let found = highlighter.highlight("The quick brown fox", 100).unwrap();
        assert_eq!(found, vec![MatchLocation::new(4, 5)]);
    }

    #[test]
    fn test_highlight_caps_results() {
        let highlighter = Highlighter::new(&MatchSpec::contains("a"));
        let text = "a".repeat(250);
        assert_eq!(highlighter.highlight(&text, 100).unwrap().len(), 100);
    }

    #[test]
    fn test_first_none_without_match() {
        let highlighter = Highlighter::new(&MatchSpec::equals("fox"));
        assert_eq!(highlighter.first("The quick brown fox").unwrap(), None);
    }
}
