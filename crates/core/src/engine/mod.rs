//! Find-in-content engine: the public entry point.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use docfind_core::config::IndexConfig;
//! use docfind_core::content::{AllowAll, MemoryProvider, ProviderRegistry};
//! use docfind_core::engine::{ContentIndexEngine, FindInContentRequest};
//! use docfind_core::matching::MatchSpec;
//!
//! let scripts = Arc::new(MemoryProvider::new("script"));
//! scripts.put("1", "Loader", "js", "The quick brown fox");
//!
//! let engine = ContentIndexEngine::new(
//!     IndexConfig::new("/tmp/docfind-index"),
//!     ProviderRegistry::new().with(scripts),
//! );
//! engine.await_ready(Duration::from_secs(10)).unwrap();
//!
//! let request = FindInContentRequest::new(MatchSpec::contains("quick"));
//! let page = engine.find_in_content(&request, &AllowAll).unwrap();
//! assert_eq!(page.values.len(), 1);
//! ```

pub mod types;

use std::time::{Duration, Instant};

use tantivy::collector::DocSetCollector;
use tantivy::query::Query;
use tantivy::{DocAddress, Searcher, TantivyDocument};

use crate::config::IndexConfig;
use crate::content::{ContentEvent, PermissionChecker, ProviderRegistry};
use crate::error::ContentIndexError;
use crate::index::query::doc_query;
use crate::index::{
    IndexLifecycle, IndexStats, IndexStatus, IndexStore, QueryBuilder, StoreError,
    StoredDocument,
};
use crate::matching::Highlighter;

pub use types::{
    ContentHighlights, ContentMatch, FetchHighlightsRequest, FindInContentRequest, PageRequest,
    PageResponse, ResultPage, SAMPLE_LENGTH,
};

/// Indexes content from registered providers and answers content searches.
///
/// The index is built in the background on first use. Dropping the engine
/// stops its background threads.
pub struct ContentIndexEngine {
    lifecycle: IndexLifecycle,
}

impl ContentIndexEngine {
    pub fn new(config: IndexConfig, providers: ProviderRegistry) -> Self {
        Self { lifecycle: IndexLifecycle::new(config, providers) }
    }

    pub fn config(&self) -> &IndexConfig {
        self.lifecycle.config()
    }

    /// Begin building the index without waiting. Returns whether it is ready.
    pub fn start(&self) -> Result<bool, ContentIndexError> {
        self.lifecycle.ensure_ready_async()
    }

    /// Wait up to `timeout` for the index to be ready.
    pub fn await_ready(&self, timeout: Duration) -> Result<(), ContentIndexError> {
        self.lifecycle.await_ready(timeout).map(|_| ())
    }

    /// Page through every item extension whose text matches the filter
    /// and which the viewer may see, in index order.
    pub fn find_in_content(
        &self,
        request: &FindInContentRequest,
        viewer: &dyn PermissionChecker,
    ) -> Result<ResultPage<ContentMatch>, ContentIndexError> {
        let start = Instant::now();
        let store = self.lifecycle.ensure_ready_or_fail()?;
        let filter = &request.filter;

        let query = match QueryBuilder::new(&store, self.config().regex_size_limit)
            .build_search_query(filter, &request.tags)
        {
            Ok(query) => query,
            Err(e) => {
                tracing::debug!("Cannot search for '{}': {}", filter.pattern, e);
                return Ok(ResultPage::empty());
            }
        };

        let searcher = store.searcher()?;
        let hits = sorted_hits(&searcher, query.as_ref())?;
        let highlighter = Highlighter::new(filter);
        let fields = store.fields();

        let mut values = Vec::new();
        let mut total = 0;
        for address in hits {
            let doc: TantivyDocument = searcher.doc(address).map_err(StoreError::from)?;
            let Some(stored) = StoredDocument::read(fields, &doc) else {
                continue;
            };
            if !viewer.has_view_permission(&stored.content) {
                continue;
            }

            let location = match highlighter.first(&stored.text) {
                Ok(Some(location)) => location,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Cannot match '{}': {}", filter.pattern, e);
                    return Ok(ResultPage::empty());
                }
            };

            if request.page.contains(total) {
                values.push(ContentMatch::new(
                    stored.content,
                    stored.extension,
                    &stored.text,
                    location,
                    stored.tags,
                ));
            }
            total += 1;
        }

        tracing::debug!(
            "Found {} {} matches for '{}' ({}) in {}ms",
            total,
            filter.match_type.as_str(),
            filter.pattern,
            if filter.case_sensitive { "case-sensitive" } else { "case-insensitive" },
            start.elapsed().as_millis()
        );
        Ok(ResultPage::new(values, request.page.offset, total))
    }

    /// Highlight every match in one item extension.
    ///
    /// Fails with [`ContentIndexError::PermissionDenied`] before touching the
    /// index when the viewer may not see the item. Returns `None` when the
    /// document is not indexed or the filter cannot be evaluated.
    pub fn fetch_highlights(
        &self,
        request: &FetchHighlightsRequest,
        viewer: &dyn PermissionChecker,
    ) -> Result<Option<ContentHighlights>, ContentIndexError> {
        if !viewer.has_view_permission(&request.content) {
            return Err(ContentIndexError::PermissionDenied(request.content.clone()));
        }

        let store = self.lifecycle.ensure_ready_or_fail()?;
        let Some(stored) = find_document(&store, request)? else {
            return Ok(None);
        };

        let highlighter = Highlighter::new(&request.filter);
        match highlighter.highlight(&stored.text, self.config().max_highlights) {
            Ok(highlights) => Ok(Some(ContentHighlights {
                content: stored.content,
                extension: stored.extension,
                text: stored.text,
                highlights,
            })),
            Err(e) => {
                tracing::debug!("Cannot highlight '{}': {}", request.filter.pattern, e);
                Ok(None)
            }
        }
    }

    /// Queue a content change. Returns whether it was accepted.
    pub fn on_content_event(&self, event: ContentEvent) -> bool {
        self.lifecycle.enqueue(event)
    }

    /// Rebuild the index from every provider; `None` when not yet ready.
    pub fn reindex_all(&self) -> Result<Option<IndexStats>, ContentIndexError> {
        self.lifecycle.reindex_all()
    }

    /// Wait until every queued event is committed.
    pub fn flush(&self) -> bool {
        self.lifecycle.flush()
    }

    pub fn status(&self) -> IndexStatus {
        self.lifecycle.status()
    }

    pub fn providers(&self) -> &ProviderRegistry {
        self.lifecycle.providers()
    }

    pub fn shutdown(&self) {
        self.lifecycle.shutdown();
    }
}

/// Every hit of `query`, ordered by segment then document id.
fn sorted_hits(searcher: &Searcher, query: &dyn Query) -> Result<Vec<DocAddress>, StoreError> {
    let mut hits: Vec<DocAddress> =
        searcher.search(query, &DocSetCollector)?.into_iter().collect();
    hits.sort_by_key(|a| (a.segment_ord, a.doc_id));
    Ok(hits)
}

fn find_document(
    store: &IndexStore,
    request: &FetchHighlightsRequest,
) -> Result<Option<StoredDocument>, StoreError> {
    let searcher = store.searcher()?;
    let query = doc_query(store.fields(), &request.content, Some(&request.extension));
    let Some(address) = sorted_hits(&searcher, query.as_ref())?.into_iter().next() else {
        return Ok(None);
    };
    let doc: TantivyDocument = searcher.doc(address)?;
    Ok(StoredDocument::read(store.fields(), &doc))
}
