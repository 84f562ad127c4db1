//! Index bootstrap state machine and the background event consumer.
//!
//! The first caller to need the index claims the `Initializing` transition
//! and a bootstrap thread opens the store, runs a full reindex and flips the
//! state to `Ready`. From then on a single consumer thread drains the event
//! queue, applying each drained run of events as one batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::builder::{BuilderError, IndexBuilder};
use super::store::IndexStore;
use super::types::{BatchProgress, IndexState, IndexStats, IndexStatus};
use crate::config::IndexConfig;
use crate::content::{ContentEvent, ProviderRegistry};
use crate::error::{BootstrapError, ContentIndexError};

/// How often an idle consumer checks for shutdown.
const CONSUMER_POLL: Duration = Duration::from_millis(100);

enum QueueMessage {
    Event(ContentEvent),
    /// Acknowledged once every earlier event is committed.
    Flush(mpsc::Sender<()>),
}

enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready(ReadyIndex),
    Failed(Arc<BootstrapError>),
}

impl LifecycleState {
    fn kind(&self) -> IndexState {
        match self {
            Self::Uninitialized => IndexState::Uninitialized,
            Self::Initializing => IndexState::Initializing,
            Self::Ready(_) => IndexState::Ready,
            Self::Failed(_) => IndexState::Failed,
        }
    }

    /// The final outcome, if bootstrap has finished.
    fn outcome(&self) -> Option<Result<Arc<IndexStore>, ContentIndexError>> {
        match self {
            Self::Ready(ready) => Some(Ok(Arc::clone(&ready.store))),
            Self::Failed(cause) => Some(Err(ContentIndexError::Unavailable(Arc::clone(cause)))),
            Self::Uninitialized | Self::Initializing => None,
        }
    }
}

struct ReadyIndex {
    store: Arc<IndexStore>,
    sender: SyncSender<QueueMessage>,
}

struct Shared {
    config: IndexConfig,
    providers: ProviderRegistry,
    state: Mutex<LifecycleState>,
    ready: Condvar,
    progress: BatchProgress,
    cancel: AtomicBool,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

/// Owns the index, its readiness and its background threads.
///
/// Each engine owns its own lifecycle, so independent engines can coexist
/// in one process.
pub struct IndexLifecycle {
    shared: Arc<Shared>,
}

impl IndexLifecycle {
    pub fn new(config: IndexConfig, providers: ProviderRegistry) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                providers,
                state: Mutex::new(LifecycleState::Uninitialized),
                ready: Condvar::new(),
                progress: BatchProgress::default(),
                cancel: AtomicBool::new(false),
                threads: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.shared.config
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.shared.providers
    }

    /// Start bootstrap if nobody has yet; never blocks.
    ///
    /// Returns whether the index is ready now.
    pub fn ensure_ready_async(&self) -> Result<bool, ContentIndexError> {
        let mut state = self.shared.state.lock();
        match &*state {
            LifecycleState::Ready(_) => return Ok(true),
            LifecycleState::Failed(cause) => {
                return Err(ContentIndexError::Unavailable(Arc::clone(cause)));
            }
            LifecycleState::Initializing => return Ok(false),
            LifecycleState::Uninitialized => {}
        }
        *state = LifecycleState::Initializing;
        drop(state);

        tracing::info!("Building content index in {}", self.shared.config.dir.display());
        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("docfind-bootstrap".into())
            .spawn(move || shared.bootstrap());

        match spawned {
            Ok(handle) => {
                self.shared.threads.lock().push(handle);
                Ok(false)
            }
            Err(e) => {
                tracing::error!("Failed to start index bootstrap: {}", e);
                let cause = Arc::new(BootstrapError::Spawn(e));
                self.shared.finish(LifecycleState::Failed(Arc::clone(&cause)));
                Err(ContentIndexError::Unavailable(cause))
            }
        }
    }

    /// Start bootstrap if needed and wait up to the configured ready timeout.
    pub fn ensure_ready_or_fail(&self) -> Result<Arc<IndexStore>, ContentIndexError> {
        self.await_ready(self.shared.config.ready_timeout())
    }

    /// Start bootstrap if needed and wait up to `timeout` for it to finish.
    ///
    /// Fails with the retryable [`ContentIndexError::NotReady`] on timeout
    /// and with [`ContentIndexError::Unavailable`] if bootstrap failed.
    pub fn await_ready(&self, timeout: Duration) -> Result<Arc<IndexStore>, ContentIndexError> {
        self.ensure_ready_async()?;

        // A deadline past the clock's range means waiting without one.
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.shared.state.lock();
        loop {
            if let Some(outcome) = state.outcome() {
                return outcome;
            }
            let Some(deadline) = deadline else {
                self.shared.ready.wait(&mut state);
                continue;
            };
            if self.shared.ready.wait_until(&mut state, deadline).timed_out() {
                return state.outcome().unwrap_or_else(|| {
                    Err(ContentIndexError::NotReady {
                        percent_complete: self.shared.progress.percent(),
                    })
                });
            }
        }
    }

    /// Queue an event for the consumer.
    ///
    /// Dropped when the index is not ready or the type has no provider.
    /// Blocks while the queue is full. Returns whether it was queued.
    pub fn enqueue(&self, event: ContentEvent) -> bool {
        if self.shared.providers.get(&event.content.content_type).is_none() {
            tracing::debug!("No provider for {}; event dropped", event.content);
            return false;
        }
        let Some(sender) = self.sender() else {
            tracing::debug!("Index not ready; dropping {:?} for {}", event.action, event.content);
            return false;
        };
        if sender.send(QueueMessage::Event(event)).is_err() {
            tracing::debug!("Index consumer stopped; event dropped");
            return false;
        }
        true
    }

    /// Block until every event queued before this call is committed.
    ///
    /// Returns false when the index is not ready or the consumer stopped.
    pub fn flush(&self) -> bool {
        let Some(sender) = self.sender() else {
            return false;
        };
        let (ack, done) = mpsc::channel();
        if sender.send(QueueMessage::Flush(ack)).is_err() {
            return false;
        }
        done.recv().is_ok()
    }

    /// Rebuild the index from every provider's current listing.
    ///
    /// Returns `None` without touching the index when it is not ready.
    pub fn reindex_all(&self) -> Result<Option<IndexStats>, ContentIndexError> {
        let store = match &*self.shared.state.lock() {
            LifecycleState::Ready(ready) => Arc::clone(&ready.store),
            other => {
                tracing::info!("Skipping reindex; index is {}", other.kind());
                return Ok(None);
            }
        };
        Ok(Some(self.shared.reindex(&store)?))
    }

    pub fn status(&self) -> IndexStatus {
        let (state, store) = {
            let guard = self.shared.state.lock();
            let store = match &*guard {
                LifecycleState::Ready(ready) => Some(Arc::clone(&ready.store)),
                _ => None,
            };
            (guard.kind(), store)
        };

        let document_count = store.and_then(|s| s.document_count().ok()).unwrap_or(0);
        let percent_complete =
            if state == IndexState::Ready { 100 } else { self.shared.progress.percent() };
        IndexStatus { state, percent_complete, document_count }
    }

    pub fn state(&self) -> IndexState {
        self.shared.state.lock().kind()
    }

    /// Stop background threads; an in-flight batch is rolled back.
    pub fn shutdown(&self) {
        if self.shared.cancel.swap(true, Ordering::SeqCst) {
            return;
        }
        loop {
            let handles: Vec<_> = self.shared.threads.lock().drain(..).collect();
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if handle.join().is_err() {
                    tracing::error!("Index thread panicked");
                }
            }
        }
        tracing::info!("Content index shut down");
    }

    fn sender(&self) -> Option<SyncSender<QueueMessage>> {
        match &*self.shared.state.lock() {
            LifecycleState::Ready(ready) => Some(ready.sender.clone()),
            _ => None,
        }
    }
}

impl Drop for IndexLifecycle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    fn bootstrap(self: Arc<Self>) {
        match self.try_bootstrap() {
            Ok((store, receiver)) => {
                let consumer = Arc::clone(&self);
                let consumer_store = Arc::clone(&store);
                let spawned = thread::Builder::new()
                    .name("docfind-consumer".into())
                    .spawn(move || consumer.consume(&consumer_store, receiver));
                match spawned {
                    Ok(handle) => self.threads.lock().push(handle),
                    Err(e) => {
                        tracing::error!("Failed to start index consumer: {}", e);
                        self.finish(LifecycleState::Failed(Arc::new(BootstrapError::Spawn(e))));
                    }
                }
            }
            Err(e) => {
                tracing::error!("Content index bootstrap failed: {}", e);
                self.finish(LifecycleState::Failed(Arc::new(e)));
            }
        }
    }

    fn try_bootstrap(&self) -> Result<(Arc<IndexStore>, Receiver<QueueMessage>), BootstrapError> {
        let start = Instant::now();
        let store = Arc::new(IndexStore::open(&self.config.dir, self.config.writer_memory_bytes)?);
        let (sender, receiver) = mpsc::sync_channel(self.config.queue_capacity);

        let stats = self.reindex(&store)?;
        if stats.cancelled || self.cancel.load(Ordering::SeqCst) {
            return Err(BootstrapError::Cancelled);
        }

        self.finish(LifecycleState::Ready(ReadyIndex { store: Arc::clone(&store), sender }));
        tracing::info!(
            "Content index ready: {} documents in {}ms",
            stats.documents_added,
            start.elapsed().as_millis()
        );
        Ok((store, receiver))
    }

    /// Publish a terminal state and wake every waiter.
    fn finish(&self, state: LifecycleState) {
        *self.state.lock() = state;
        self.ready.notify_all();
    }

    fn reindex(&self, store: &IndexStore) -> Result<IndexStats, BuilderError> {
        let mut types = Vec::new();
        let mut events = Vec::new();
        for provider in self.providers.providers() {
            match provider.list_documents() {
                Ok(documents) => {
                    types.push(provider.content_type().to_string());
                    events.extend(documents.into_iter().map(ContentEvent::update));
                }
                Err(e) => {
                    tracing::warn!("Failed to list {} content: {}", provider.content_type(), e);
                }
            }
        }

        let stats = IndexBuilder::new(store, &self.providers, &self.cancel)
            .with_progress(&self.progress)
            .rebuild(&types, &events)?;
        tracing::info!(
            "Reindexed {} items: {} documents, {} skipped in {}ms",
            stats.events,
            stats.documents_added,
            stats.documents_skipped,
            stats.duration_ms
        );
        Ok(stats)
    }

    fn consume(&self, store: &IndexStore, receiver: Receiver<QueueMessage>) {
        let builder =
            IndexBuilder::new(store, &self.providers, &self.cancel).with_progress(&self.progress);

        while !self.cancel.load(Ordering::Relaxed) {
            let first = match receiver.recv_timeout(CONSUMER_POLL) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let mut events = Vec::new();
            for message in std::iter::once(first).chain(receiver.try_iter()) {
                match message {
                    QueueMessage::Event(event) => events.push(event),
                    QueueMessage::Flush(ack) => {
                        apply_batch(&builder, &mut events);
                        // The flusher may have given up waiting.
                        let _ = ack.send(());
                    }
                }
            }
            apply_batch(&builder, &mut events);
        }
        tracing::debug!("Index consumer stopped");
    }
}

fn apply_batch(builder: &IndexBuilder<'_>, events: &mut Vec<ContentEvent>) {
    if events.is_empty() {
        return;
    }
    if let Err(e) = builder.apply(events) {
        tracing::error!("Failed to apply {} index events: {}", events.len(), e);
    }
    events.clear();
}
