//! Applies batches of content events to the index.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tantivy::{IndexWriter, TantivyError, Term};
use thiserror::Error;

use super::document::build_document;
use super::query::doc_query;
use super::store::{IndexStore, StoreError};
use super::types::{BatchProgress, IndexStats};
use crate::content::{ContentEvent, ProviderRegistry};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Index write error: {0}")]
    Write(#[from] TantivyError),

    #[error("Index store error: {0}")]
    Store(#[from] StoreError),
}

/// Writes event batches through the store's single writer.
pub struct IndexBuilder<'a> {
    store: &'a IndexStore,
    providers: &'a ProviderRegistry,
    cancel: &'a AtomicBool,
    progress: Option<&'a BatchProgress>,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(store: &'a IndexStore, providers: &'a ProviderRegistry, cancel: &'a AtomicBool) -> Self {
        Self { store, providers, cancel, progress: None }
    }

    /// Report per-event progress while applying.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a BatchProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Apply `events` in order as one transaction.
    ///
    /// Holds the writer lock for the whole batch and commits once. When the
    /// cancel flag is raised mid-batch the writer is rolled back instead.
    pub fn apply(&self, events: &[ContentEvent]) -> Result<IndexStats, BuilderError> {
        self.run(&[], events)
    }

    /// Replace every document of `content_types` with the result of `events`
    /// in a single transaction, so items that vanished from a provider drop
    /// out of the index.
    pub fn rebuild(
        &self,
        content_types: &[String],
        events: &[ContentEvent],
    ) -> Result<IndexStats, BuilderError> {
        self.run(content_types, events)
    }

    fn run(&self, purge: &[String], events: &[ContentEvent]) -> Result<IndexStats, BuilderError> {
        let start = Instant::now();
        let mut stats = IndexStats { events: events.len(), ..Default::default() };

        let mut writer = self.store.writer();
        if let Some(progress) = self.progress {
            progress.start(events.len());
        }
        let result = self.write_events(&mut writer, purge, events, &mut stats);

        match result {
            Ok(()) if stats.cancelled => {
                writer.rollback()?;
                tracing::info!(
                    "Index batch cancelled after {} of {} events; rolled back",
                    stats.processed,
                    stats.events
                );
            }
            Ok(()) => {
                writer.commit()?;
            }
            Err(e) => {
                if let Err(rollback) = writer.rollback() {
                    tracing::error!("Failed to roll back index batch: {}", rollback);
                }
                return Err(e);
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Applied {} events: {} added, {} skipped, {} deleted in {}ms",
            stats.events,
            stats.documents_added,
            stats.documents_skipped,
            stats.deletes,
            stats.duration_ms
        );
        Ok(stats)
    }

    fn write_events(
        &self,
        writer: &mut IndexWriter,
        purge: &[String],
        events: &[ContentEvent],
        stats: &mut IndexStats,
    ) -> Result<(), BuilderError> {
        let fields = self.store.fields();

        for content_type in purge {
            let term = Term::from_field_text(fields.content_type, content_type);
            writer.delete_term(term);
        }

        for event in events {
            if self.cancelled() {
                stats.cancelled = true;
                return Ok(());
            }

            let content = &event.content;
            let Some(provider) = self.providers.get(&content.content_type) else {
                tracing::debug!("No provider for {}; ignoring event", content);
                self.advance();
                stats.processed += 1;
                continue;
            };

            if event.action.deletes() {
                writer.delete_query(doc_query(fields, content, None))?;
                stats.deletes += 1;
            }

            if event.action.adds() {
                match provider.indexable_data(content) {
                    Ok(data) => {
                        let tags = provider.tags(content);
                        for (extension, text) in &data {
                            if self.cancelled() {
                                stats.cancelled = true;
                                return Ok(());
                            }
                            writer.add_document(build_document(
                                fields, content, extension, text, &tags,
                            ))?;
                            stats.documents_added += 1;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to index {}: {}", content, e);
                        stats.documents_skipped += 1;
                    }
                }
            }

            self.advance();
            stats.processed += 1;
        }

        Ok(())
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn advance(&self) {
        if let Some(progress) = self.progress {
            progress.advance();
        }
    }
}
