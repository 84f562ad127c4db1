//! Index schema, field handles and analyzers.

use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};
use tantivy::tokenizer::{
    LowerCaser, NgramTokenizer, RawTokenizer, TextAnalyzer, Token, TokenFilter, TokenStream,
    Tokenizer,
};
use tantivy::{Index, TantivyError};

/// Smallest n-gram emitted into the n-gram fields.
pub const MIN_GRAM: usize = 1;
/// Largest n-gram emitted into the n-gram fields.
pub const MAX_GRAM: usize = 2;

/// Bodies longer than this are not indexed as a single raw term.
pub const MAX_RAW_TERM_BYTES: usize = 32 * 1024;

pub const NGRAM_CI: &str = "ngram_ci";
pub const NGRAM_CS: &str = "ngram_cs";
pub const KEYWORD_CI: &str = "keyword_ci";

/// Marker value of the `oversize` field.
pub const OVERSIZE_MARKER: &str = "1";

/// Handles for every field of the content schema.
#[derive(Debug, Clone, Copy)]
pub struct ContentFields {
    pub content_type: Field,
    pub uuid: Field,
    pub name: Field,
    pub extension: Field,
    /// Stored body text.
    pub text: Field,
    /// Whole body as one untokenized term, for regex queries.
    pub text_raw: Field,
    /// Present on documents whose body exceeds [`MAX_RAW_TERM_BYTES`].
    pub oversize: Field,
    /// Lower-cased n-grams of the body.
    pub data_ngram: Field,
    /// Case-preserving n-grams of the body.
    pub data_cs_ngram: Field,
    pub tag: Field,
}

impl ContentFields {
    pub fn from_schema(schema: &Schema) -> Result<Self, TantivyError> {
        Ok(Self {
            content_type: schema.get_field("type")?,
            uuid: schema.get_field("uuid")?,
            name: schema.get_field("name")?,
            extension: schema.get_field("extension")?,
            text: schema.get_field("text")?,
            text_raw: schema.get_field("text_raw")?,
            oversize: schema.get_field("oversize")?,
            data_ngram: schema.get_field("data_ngram")?,
            data_cs_ngram: schema.get_field("data_cs_ngram")?,
            tag: schema.get_field("tag")?,
        })
    }

    /// The n-gram field matching a case sensitivity.
    pub fn ngram(&self, case_sensitive: bool) -> Field {
        if case_sensitive { self.data_cs_ngram } else { self.data_ngram }
    }
}

pub fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("type", STRING | STORED);
    builder.add_text_field("uuid", STRING | STORED);
    builder.add_text_field("name", STRING | STORED);
    builder.add_text_field("extension", STRING | STORED);
    builder.add_text_field("text", STORED);
    builder.add_text_field("text_raw", STRING);
    builder.add_text_field("oversize", STRING);

    let ngram = |tokenizer: &str| {
        TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(tokenizer)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        )
    };
    builder.add_text_field("data_ngram", ngram(NGRAM_CI));
    builder.add_text_field("data_cs_ngram", ngram(NGRAM_CS));

    let tag = TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(KEYWORD_CI)
                .set_index_option(IndexRecordOption::Basic),
        )
        .set_stored();
    builder.add_text_field("tag", tag);

    builder.build()
}

/// Register the per-field analyzers on an index.
pub fn register_analyzers(index: &Index) -> Result<(), TantivyError> {
    let tokenizers = index.tokenizers();

    let ngram_ci = TextAnalyzer::builder(NgramTokenizer::new(MIN_GRAM, MAX_GRAM, false)?)
        .filter(LowerCaser)
        .filter(IncrementPositionFilter)
        .build();
    tokenizers.register(NGRAM_CI, ngram_ci);

    let ngram_cs = TextAnalyzer::builder(NgramTokenizer::new(MIN_GRAM, MAX_GRAM, false)?)
        .filter(IncrementPositionFilter)
        .build();
    tokenizers.register(NGRAM_CS, ngram_cs);

    let keyword_ci = TextAnalyzer::builder(RawTokenizer::default()).filter(LowerCaser).build();
    tokenizers.register(KEYWORD_CI, keyword_ci);

    Ok(())
}

/// Gives n-grams consecutive positions.
///
/// `NgramTokenizer` emits every gram at position 0, which makes phrase
/// queries over grams meaningless.
#[derive(Clone)]
struct IncrementPositionFilter;

impl TokenFilter for IncrementPositionFilter {
    type Tokenizer<T: Tokenizer> = IncrementPositionWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        IncrementPositionWrapper(tokenizer)
    }
}

#[derive(Clone)]
struct IncrementPositionWrapper<T>(T);

impl<T: Tokenizer> Tokenizer for IncrementPositionWrapper<T> {
    type TokenStream<'a> = IncrementPositionStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        IncrementPositionStream { inner: self.0.token_stream(text), position: 0 }
    }
}

struct IncrementPositionStream<T> {
    inner: T,
    position: usize,
}

impl<T: TokenStream> TokenStream for IncrementPositionStream<T> {
    fn advance(&mut self) -> bool {
        if !self.inner.advance() {
            return false;
        }
        self.inner.token_mut().position = self.position;
        self.position += 1;
        true
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }
}

/// Run a registered analyzer over `text` and collect the token texts.
pub fn analyze(index: &Index, analyzer: &str, text: &str) -> Option<Vec<String>> {
    let mut analyzer = index.tokenizers().get(analyzer)?;
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(token.text.clone());
    }
    Some(tokens)
}
