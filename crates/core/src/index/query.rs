//! Translation of match specifications into index queries.
//!
//! The index query only narrows the candidate set. Every hit is verified
//! afterwards by [`crate::matching::Highlighter`], so a query may over-match
//! but must never miss a document the matcher would accept.

use regex::RegexBuilder;
use tantivy::Term;
use tantivy::query::{AllQuery, BooleanQuery, Occur, PhraseQuery, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption};
use thiserror::Error;

use super::schema::{ContentFields, NGRAM_CI, NGRAM_CS, OVERSIZE_MARKER};
use super::store::{IndexStore, StoreError};
use crate::content::ContentRef;
use crate::matching::matcher::strip_regex_slashes;
use crate::matching::tags::normalize_tag;
use crate::matching::{MatchSpec, MatchType, TagFilter};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Regex rejected '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Builds queries against one open index.
pub struct QueryBuilder<'a> {
    store: &'a IndexStore,
    fields: ContentFields,
    regex_size_limit: usize,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(store: &'a IndexStore, regex_size_limit: usize) -> Self {
        Self { store, fields: *store.fields(), regex_size_limit }
    }

    /// Query for documents that may satisfy `spec` and carry every tag,
    /// both those embedded in the pattern and `extra_tags`.
    pub fn build_search_query(
        &self,
        spec: &MatchSpec,
        extra_tags: &[String],
    ) -> Result<Box<dyn Query>, QueryError> {
        let filter = TagFilter::parse(&spec.pattern).with_tags(extra_tags);

        let text_query = if filter.has_text() {
            self.text_query(spec.match_type, &filter.text, spec.case_sensitive)?
        } else {
            None
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        if let Some(query) = text_query {
            clauses.push((Occur::Must, query));
        }
        for tag in &filter.tags {
            clauses.push((Occur::Must, term_query(self.fields.tag, tag)));
        }

        Ok(match clauses.len() {
            0 => Box::new(AllQuery),
            1 => clauses.remove(0).1,
            _ => Box::new(BooleanQuery::new(clauses)),
        })
    }

    /// Query for the documents of one item, optionally one extension only.
    pub fn build_doc_query(&self, content: &ContentRef, extension: Option<&str>) -> Box<dyn Query> {
        doc_query(&self.fields, content, extension)
    }

    fn text_query(
        &self,
        match_type: MatchType,
        text: &str,
        case_sensitive: bool,
    ) -> Result<Option<Box<dyn Query>>, QueryError> {
        let query = match match_type {
            MatchType::Contains
            | MatchType::Equals
            | MatchType::StartsWith
            | MatchType::EndsWith => Some(self.phrase_query(text, case_sensitive)?),
            MatchType::CharsAnywhere => Some(self.chars_query(text, case_sensitive)?),
            MatchType::Regex => Some(self.regex_query(text, case_sensitive)?),
            MatchType::NotEquals
            | MatchType::Any
            | MatchType::Null
            | MatchType::NonNull
            | MatchType::Blank
            | MatchType::NonBlank
            | MatchType::Empty
            | MatchType::NonEmpty
            | MatchType::NullOrBlank
            | MatchType::NullOrEmpty => None,
        };
        Ok(query)
    }

    fn grams(&self, text: &str, case_sensitive: bool) -> Result<Vec<Term>, QueryError> {
        let analyzer = if case_sensitive { NGRAM_CS } else { NGRAM_CI };
        let field = self.fields.ngram(case_sensitive);
        Ok(self
            .store
            .analyze(analyzer, text)?
            .iter()
            .map(|gram| Term::from_field_text(field, gram))
            .collect())
    }

    fn phrase_query(&self, text: &str, case_sensitive: bool) -> Result<Box<dyn Query>, QueryError> {
        let mut terms = self.grams(text, case_sensitive)?;
        Ok(match terms.len() {
            0 => Box::new(AllQuery),
            1 => Box::new(TermQuery::new(terms.remove(0), IndexRecordOption::WithFreqs)),
            _ => Box::new(PhraseQuery::new(terms)),
        })
    }

    /// Every character must occur somewhere; order is left to the matcher.
    fn chars_query(&self, text: &str, case_sensitive: bool) -> Result<Box<dyn Query>, QueryError> {
        let mut terms: Vec<Term> = Vec::new();
        for ch in text.chars() {
            let grams = self.grams(ch.encode_utf8(&mut [0; 4]), case_sensitive)?;
            if let Some(term) = grams.into_iter().next()
                && !terms.contains(&term)
            {
                terms.push(term);
            }
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .into_iter()
            .map(|term| {
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::Basic));
                (Occur::Must, query)
            })
            .collect();
        Ok(if clauses.is_empty() { Box::new(AllQuery) } else { Box::new(BooleanQuery::new(clauses)) })
    }

    fn regex_query(&self, text: &str, case_sensitive: bool) -> Result<Box<dyn Query>, QueryError> {
        let pattern = whole_term_regex(strip_regex_slashes(text), case_sensitive);

        RegexBuilder::new(&pattern)
            .size_limit(self.regex_size_limit)
            .build()
            .map_err(|source| QueryError::InvalidRegex { pattern: pattern.clone(), source })?;

        // Syntax the index automaton lacks, such as word boundaries, leaves
        // every document to the matcher.
        let regex = match RegexQuery::from_pattern(&pattern, self.fields.text_raw) {
            Ok(regex) => regex,
            Err(e) => {
                tracing::debug!("Index cannot narrow regex '{}': {}", pattern, e);
                return Ok(Box::new(AllQuery));
            }
        };

        let clauses: Vec<(Occur, Box<dyn Query>)> = vec![
            (Occur::Should, Box::new(regex)),
            (Occur::Should, term_query(self.fields.oversize, OVERSIZE_MARKER)),
        ];
        Ok(Box::new(BooleanQuery::new(clauses)))
    }
}

/// Equality query on type, uuid and optionally extension.
pub fn doc_query(
    fields: &ContentFields,
    content: &ContentRef,
    extension: Option<&str>,
) -> Box<dyn Query> {
    let mut clauses = vec![
        (Occur::Must, term_query(fields.content_type, &content.content_type)),
        (Occur::Must, term_query(fields.uuid, &content.uuid)),
    ];
    if let Some(extension) = extension {
        clauses.push((Occur::Must, term_query(fields.extension, extension)));
    }
    Box::new(BooleanQuery::new(clauses))
}

fn term_query(field: Field, value: &str) -> Box<dyn Query> {
    Box::new(TermQuery::new(Term::from_field_text(field, value), IndexRecordOption::Basic))
}

/// Wrap a user regex so it matches a whole raw term.
///
/// The index automaton is implicitly anchored at both ends, so a user `^` or
/// `$` takes the place of the `.*` on that side. With alternation the anchors
/// bind to single branches only; both sides then stay open.
pub fn whole_term_regex(body: &str, case_sensitive: bool) -> String {
    let alternation = body.contains('|');
    let (body, anchored_start) = match body.strip_prefix('^') {
        Some(rest) => (rest, !alternation),
        None => (body, false),
    };
    let (body, anchored_end) = match body.strip_suffix('$') {
        Some(rest) if !ends_with_escape(rest) => (rest, !alternation),
        _ => (body, false),
    };

    let mut pattern = String::from(if case_sensitive { "(?s)" } else { "(?si)" });
    if !anchored_start {
        pattern.push_str(".*");
    }
    pattern.push_str("(?:");
    pattern.push_str(body);
    pattern.push(')');
    if !anchored_end {
        pattern.push_str(".*");
    }
    pattern
}

/// True when `s` ends in an odd number of backslashes.
fn ends_with_escape(s: &str) -> bool {
    s.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}
