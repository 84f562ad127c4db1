//! Content provider seam and the per-type registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use thiserror::Error;

use super::types::ContentRef;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("content root does not exist: {0}")]
    MissingRoot(String),

    #[error("content not found: {0}")]
    NotFound(ContentRef),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {0}: {1}")]
    Walk(String, #[source] walkdir::Error),

    #[error("{0}")]
    Other(String),
}

/// Source of indexable content for one content type.
pub trait ContentProvider: Send + Sync {
    /// The type this provider owns; unique within a registry.
    fn content_type(&self) -> &str;

    /// Every item currently available.
    fn list_documents(&self) -> Result<Vec<ContentRef>, ProviderError>;

    /// Indexable text for an item, keyed by extension.
    fn indexable_data(&self, content: &ContentRef)
    -> Result<BTreeMap<String, String>, ProviderError>;

    /// Tags attached to an item.
    fn tags(&self, _content: &ContentRef) -> Vec<String> {
        Vec::new()
    }
}

/// Maps content types to their provider.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ContentProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider, replacing any previous one for the same type.
    pub fn register(&mut self, provider: Arc<dyn ContentProvider>) {
        let content_type = provider.content_type().to_string();
        if self.providers.insert(content_type.clone(), provider).is_some() {
            tracing::warn!("Replaced content provider for type '{}'", content_type);
        }
    }

    #[must_use]
    pub fn with(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn ContentProvider>> {
        self.providers.get(content_type)
    }

    /// Providers in type order.
    pub fn providers(&self) -> Vec<&Arc<dyn ContentProvider>> {
        let mut providers: Vec<_> = self.providers.values().collect();
        providers.sort_by(|a, b| a.content_type().cmp(b.content_type()));
        providers
    }

    pub fn content_types(&self) -> Vec<&str> {
        self.providers().into_iter().map(|p| p.content_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry").field("types", &self.content_types()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemoryProvider;

    #[test]
    fn test_lookup_by_type() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(MemoryProvider::new("script")))
            .with(Arc::new(MemoryProvider::new("pipeline")));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("script").is_some());
        assert!(registry.get("dictionary").is_none());
        assert_eq!(registry.content_types(), vec!["pipeline", "script"]);
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MemoryProvider::new("script")));
        registry.register(Arc::new(MemoryProvider::new("script")));
        assert_eq!(registry.len(), 1);
    }
}
