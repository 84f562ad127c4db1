//! In-memory content provider.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::provider::{ContentProvider, ProviderError};
use super::types::ContentRef;

#[derive(Debug, Clone)]
struct StoredItem {
    content: ContentRef,
    data: BTreeMap<String, String>,
    tags: Vec<String>,
}

/// Provider over items held in memory, keyed by uuid.
#[derive(Debug)]
pub struct MemoryProvider {
    content_type: String,
    items: RwLock<BTreeMap<String, StoredItem>>,
}

impl MemoryProvider {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self { content_type: content_type.into(), items: RwLock::new(BTreeMap::new()) }
    }

    /// Insert or replace an item with a single extension.
    ///
    /// Returns the item's reference for building events.
    pub fn put(&self, uuid: &str, name: &str, extension: &str, text: &str) -> ContentRef {
        self.put_all(uuid, name, [(extension, text)])
    }

    /// Insert or replace an item with every given extension.
    pub fn put_all<'a, I>(&self, uuid: &str, name: &str, extensions: I) -> ContentRef
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let content = ContentRef::new(&self.content_type, uuid).with_name(name);
        let data = extensions
            .into_iter()
            .map(|(ext, text)| (ext.to_string(), text.to_string()))
            .collect();

        let mut items = self.items.write();
        let tags = items.get(uuid).map(|item| item.tags.clone()).unwrap_or_default();
        items.insert(uuid.to_string(), StoredItem { content: content.clone(), data, tags });
        content
    }

    /// Replace an item's tags. Unknown uuids are ignored.
    pub fn set_tags<I, S>(&self, uuid: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(item) = self.items.write().get_mut(uuid) {
            item.tags = tags.into_iter().map(Into::into).collect();
        }
    }

    pub fn remove(&self, uuid: &str) -> Option<ContentRef> {
        self.items.write().remove(uuid).map(|item| item.content)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl ContentProvider for MemoryProvider {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn list_documents(&self) -> Result<Vec<ContentRef>, ProviderError> {
        Ok(self.items.read().values().map(|item| item.content.clone()).collect())
    }

    fn indexable_data(
        &self,
        content: &ContentRef,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        self.items
            .read()
            .get(&content.uuid)
            .map(|item| item.data.clone())
            .ok_or_else(|| ProviderError::NotFound(content.clone()))
    }

    fn tags(&self, content: &ContentRef) -> Vec<String> {
        self.items.read().get(&content.uuid).map(|item| item.tags.clone()).unwrap_or_default()
    }
}
