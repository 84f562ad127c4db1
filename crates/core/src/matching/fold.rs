//! Locale-invariant case folding that remembers where each folded byte came from.

/// Lower-cased copy of a string with a byte map back to the original.
///
/// `char::to_lowercase` may change the UTF-8 length of a character, so spans
/// found in the folded text are translated through [`Folded::original_span`].
#[derive(Debug, Clone)]
pub struct Folded {
    text: String,
    /// For every folded byte, the (start, end) byte range of its source char.
    origin: Vec<(usize, usize)>,
    original_len: usize,
}

impl Folded {
    pub fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());

        for (start, ch) in original.char_indices() {
            let end = start + ch.len_utf8();
            for lower in ch.to_lowercase() {
                text.push(lower);
                origin.extend(std::iter::repeat_n((start, end), lower.len_utf8()));
            }
        }

        Self { text, origin, original_len: original.len() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Map a `[start, end)` span of the folded text onto the original text.
    pub fn original_span(&self, start: usize, end: usize) -> (usize, usize) {
        let orig_start = self.origin.get(start).map_or(self.original_len, |o| o.0);
        let orig_end = if end > start {
            self.origin.get(end - 1).map_or(self.original_len, |o| o.1)
        } else {
            orig_start
        };
        (orig_start, orig_end)
    }
}

/// Fold a string without keeping the offset map.
pub fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_offsets_are_identity() {
        let folded = Folded::new("Hello World");
        assert_eq!(folded.as_str(), "hello world");
        assert_eq!(folded.original_span(6, 11), (6, 11));
    }

    #[test]
    fn test_length_changing_fold_maps_back() {
        // 'İ' (2 bytes) lower-cases to "i̇" (3 bytes).
        let original = "xİy";
        let folded = Folded::new(original);
        let pos = folded.as_str().find('y').unwrap();
        let (start, end) = folded.original_span(pos, pos + 1);
        assert_eq!(&original[start..end], "y");

        let (start, end) = folded.original_span(1, pos);
        assert_eq!(&original[start..end], "İ");
    }

    #[test]
    fn test_empty_span_at_end() {
        let folded = Folded::new("abc");
        assert_eq!(folded.original_span(3, 3), (3, 3));
    }

    #[test]
    fn test_fold_str() {
        assert_eq!(fold("ÀBC"), "àbc");
    }
}
