//! On-disk index handle.

use std::path::{Path, PathBuf};

use parking_lot::{Mutex, MutexGuard};
use tantivy::collector::Count;
use tantivy::directory::MmapDirectory;
use tantivy::directory::error::OpenDirectoryError;
use tantivy::query::{PhraseQuery, Query};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyError, Term};
use thiserror::Error;

use super::schema::{self, ContentFields, NGRAM_CI};

/// Smallest writer heap tantivy accepts per indexing thread.
const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

/// Text searched by the self-check run against an existing index.
const SELF_CHECK_TEXT: &str = "test";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Index error: {0}")]
    Tantivy(#[from] TantivyError),

    #[error("Index directory error: {0}")]
    Directory(#[from] OpenDirectoryError),

    #[error("Index I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Analyzer not registered: {0}")]
    MissingAnalyzer(String),
}

/// The index, its fields and the single writer.
pub struct IndexStore {
    dir: PathBuf,
    index: Index,
    fields: ContentFields,
    writer: Mutex<IndexWriter>,
}

impl IndexStore {
    /// Open the index in `dir`, recreating it when the existing content
    /// cannot be opened or fails the self-check.
    pub fn open(dir: &Path, writer_memory_bytes: usize) -> Result<Self, StoreError> {
        create_dir(dir)?;

        let (index, fields) = match open_checked(dir) {
            Ok(opened) => opened,
            Err(e) => {
                tracing::warn!("Discarding unusable index at {}: {}", dir.display(), e);
                clear_dir(dir)?;
                open_checked(dir)?
            }
        };

        let writer: IndexWriter =
            index.writer_with_num_threads(1, writer_memory_bytes.max(MIN_WRITER_MEMORY_BYTES))?;

        tracing::debug!("Opened index at {}", dir.display());
        Ok(Self { dir: dir.to_path_buf(), index, fields, writer: Mutex::new(writer) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn fields(&self) -> &ContentFields {
        &self.fields
    }

    /// Exclusive access to the writer for one batch.
    pub fn writer(&self) -> MutexGuard<'_, IndexWriter> {
        self.writer.lock()
    }

    /// A searcher over a freshly opened reader, seeing every committed batch.
    pub fn searcher(&self) -> Result<Searcher, StoreError> {
        fresh_searcher(&self.index)
    }

    /// Number of live documents in the last commit.
    pub fn document_count(&self) -> Result<u64, StoreError> {
        Ok(self.searcher()?.num_docs())
    }

    /// Token texts produced by a registered analyzer.
    pub fn analyze(&self, analyzer: &str, text: &str) -> Result<Vec<String>, StoreError> {
        schema::analyze(&self.index, analyzer, text)
            .ok_or_else(|| StoreError::MissingAnalyzer(analyzer.to_string()))
    }
}

impl std::fmt::Debug for IndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexStore").field("dir", &self.dir).finish_non_exhaustive()
    }
}

fn fresh_searcher(index: &Index) -> Result<Searcher, StoreError> {
    let reader: IndexReader =
        index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
    Ok(reader.searcher())
}

fn open_checked(dir: &Path) -> Result<(Index, ContentFields), StoreError> {
    let directory = MmapDirectory::open(dir)?;
    let index = Index::open_or_create(directory, schema::build_schema())?;
    schema::register_analyzers(&index)?;
    let fields = ContentFields::from_schema(&index.schema())?;
    self_check(&index, &fields)?;
    Ok((index, fields))
}

/// Run a representative n-gram phrase query against the index.
fn self_check(index: &Index, fields: &ContentFields) -> Result<(), StoreError> {
    let grams = schema::analyze(index, NGRAM_CI, SELF_CHECK_TEXT)
        .ok_or_else(|| StoreError::MissingAnalyzer(NGRAM_CI.to_string()))?;
    let terms = grams.iter().map(|g| Term::from_field_text(fields.data_ngram, g)).collect();
    let query: Box<dyn Query> = Box::new(PhraseQuery::new(terms));
    fresh_searcher(index)?.search(query.as_ref(), &Count)?;
    Ok(())
}

fn create_dir(dir: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| StoreError::Io { path: dir.display().to_string(), source })
}

fn clear_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .map_err(|source| StoreError::Io { path: dir.display().to_string(), source })?;
    }
    create_dir(dir)
}
