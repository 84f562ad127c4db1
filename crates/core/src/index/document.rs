//! Conversion between content items and index documents.

use tantivy::TantivyDocument;
use tantivy::schema::Value;

use super::schema::{ContentFields, MAX_RAW_TERM_BYTES, OVERSIZE_MARKER};
use crate::content::ContentRef;
use crate::matching::tags::normalize_tag;

/// One index document for an item extension.
pub fn build_document(
    fields: &ContentFields,
    content: &ContentRef,
    extension: &str,
    text: &str,
    tags: &[String],
) -> TantivyDocument {
    let mut doc = TantivyDocument::default();
    doc.add_text(fields.content_type, &content.content_type);
    doc.add_text(fields.uuid, &content.uuid);
    if let Some(name) = &content.name {
        doc.add_text(fields.name, name);
    }
    doc.add_text(fields.extension, extension);

    doc.add_text(fields.text, text);
    if text.len() <= MAX_RAW_TERM_BYTES {
        doc.add_text(fields.text_raw, text);
    } else {
        doc.add_text(fields.oversize, OVERSIZE_MARKER);
    }
    doc.add_text(fields.data_ngram, text);
    doc.add_text(fields.data_cs_ngram, text);

    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(tag);
        if !tag.is_empty() && !seen.contains(&tag) {
            doc.add_text(fields.tag, &tag);
            seen.push(tag);
        }
    }
    doc
}

/// Stored fields of a matched document.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub content: ContentRef,
    pub extension: String,
    pub text: String,
    pub tags: Vec<String>,
}

impl StoredDocument {
    /// Read back a document; `None` when identity fields are missing.
    pub fn read(fields: &ContentFields, doc: &TantivyDocument) -> Option<Self> {
        let text_of = |field| doc.get_first(field).and_then(|v| v.as_str()).map(str::to_string);

        let mut content = ContentRef::new(text_of(fields.content_type)?, text_of(fields.uuid)?);
        content.name = text_of(fields.name);

        Some(Self {
            content,
            extension: text_of(fields.extension)?,
            text: text_of(fields.text).unwrap_or_default(),
            tags: doc
                .get_all(fields.tag)
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::schema::build_schema;

    fn fields() -> ContentFields {
        ContentFields::from_schema(&build_schema()).unwrap()
    }

    #[test]
    fn test_round_trip_stored_fields() {
        let fields = fields();
        let content = ContentRef::new("script", "1").with_name("Loader");
        let doc = build_document(&fields, &content, "js", "load()", &["Prod".into()]);

        let stored = StoredDocument::read(&fields, &doc).unwrap();
        assert_eq!(stored.content, content);
        assert_eq!(stored.content.name.as_deref(), Some("Loader"));
        assert_eq!(stored.extension, "js");
        assert_eq!(stored.text, "load()");
        assert_eq!(stored.tags, vec!["prod"]);
    }

    #[test]
    fn test_oversize_body_gets_marker_instead_of_raw_term() {
        let fields = fields();
        let content = ContentRef::new("script", "1");

        let small = build_document(&fields, &content, "js", "abc", &[]);
        assert!(small.get_first(fields.text_raw).is_some());
        assert!(small.get_first(fields.oversize).is_none());

        let body = "x".repeat(MAX_RAW_TERM_BYTES + 1);
        let large =
            build_document(&fields, &content, "js", &body, &["Prod".into(), "prod".into()]);
        assert!(large.get_first(fields.text_raw).is_none());
        assert!(large.get_first(fields.oversize).is_some());
        assert_eq!(large.get_all(fields.tag).count(), 1);
    }

    #[test]
    fn test_missing_identity_is_none() {
        let fields = fields();
        assert!(StoredDocument::read(&fields, &TantivyDocument::default()).is_none());
    }
}
