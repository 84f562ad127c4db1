//! Splits `tag:<value>` tokens out of a search pattern.

use std::sync::LazyLock;

use regex::Regex;

static TAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)tag:(\S*)").expect("tag token pattern is valid")
});

/// Required tags plus the remaining match text of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilter {
    /// Lower-cased, de-duplicated, in order of first appearance.
    pub tags: Vec<String>,
    pub text: String,
}

impl TagFilter {
    /// Parse a raw pattern.
    ///
    /// `"tag:prod foo  bar tag:EU"` gives tags `["prod", "eu"]` and text
    /// `"foo  bar"`.
    pub fn parse(pattern: &str) -> Self {
        let mut tags = Vec::new();
        for cap in TAG_TOKEN.captures_iter(pattern) {
            push_tag(&mut tags, &cap[1]);
        }
        let text = TAG_TOKEN.replace_all(pattern, "").trim().to_string();
        Self { tags, text }
    }

    /// Add extra required tags supplied outside the pattern.
    pub fn with_tags<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in extra {
            push_tag(&mut self.tags, tag.as_ref());
        }
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Normalise a tag value the way it is stored in the index.
pub fn normalize_tag(tag: &str) -> String {
    super::fold::fold(tag.trim())
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = normalize_tag(raw);
    if !tag.is_empty() && !tags.contains(&tag) {
        tags.push(tag);
    }
}
