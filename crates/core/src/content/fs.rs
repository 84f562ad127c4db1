//! Filesystem-backed content provider.
//!
//! Each file under the source root whose extension is configured belongs to
//! a content item named by its path without the extension, so `a/load.js`
//! and `a/load.meta` are the `js` and `meta` extensions of one item.

use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use walkdir::WalkDir;

use super::provider::{ContentProvider, ProviderError};
use super::types::ContentRef;

/// Provider over one directory tree.
#[derive(Debug)]
pub struct DirectoryProvider {
    content_type: String,
    root: PathBuf,
    /// Lower-cased extensions to include; empty includes every extension.
    extensions: Vec<String>,
    tags: Vec<String>,
    /// uuid to item path relative to root, without extension.
    known: RwLock<HashMap<String, PathBuf>>,
}

impl DirectoryProvider {
    pub fn new(
        content_type: impl Into<String>,
        root: &Path,
        extensions: Vec<String>,
        tags: Vec<String>,
    ) -> Result<Self, ProviderError> {
        let root = root
            .canonicalize()
            .map_err(|_| ProviderError::MissingRoot(root.display().to_string()))?;
        if !root.is_dir() {
            return Err(ProviderError::MissingRoot(root.display().to_string()));
        }

        let extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Ok(Self {
            content_type: content_type.into(),
            root,
            extensions,
            tags,
            known: RwLock::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every included file, grouped by item path.
    fn walk(&self) -> Result<BTreeMap<PathBuf, Vec<(String, PathBuf)>>, ProviderError> {
        let mut items: BTreeMap<PathBuf, Vec<(String, PathBuf)>> = BTreeMap::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry
                .map_err(|e| ProviderError::Walk(self.root.display().to_string(), e))?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(extension) = self.included_extension(path) else {
                continue;
            };
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            items
                .entry(relative.with_extension(""))
                .or_default()
                .push((extension, path.to_path_buf()));
        }

        Ok(items)
    }

    fn included_extension(&self, path: &Path) -> Option<String> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        if self.extensions.is_empty() || self.extensions.contains(&extension) {
            Some(extension)
        } else {
            None
        }
    }

    fn content_ref(&self, item: &Path) -> ContentRef {
        let name = item.file_name().map(|n| n.to_string_lossy().into_owned());
        let content = ContentRef::new(&self.content_type, item_uuid(item));
        match name {
            Some(name) => content.with_name(name),
            None => content,
        }
    }

    fn resolve(&self, content: &ContentRef) -> Result<PathBuf, ProviderError> {
        if let Some(item) = self.known.read().get(&content.uuid) {
            return Ok(item.clone());
        }
        // Unknown uuid: the item may have been created since the last listing.
        self.list_documents()?;
        self.known
            .read()
            .get(&content.uuid)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(content.clone()))
    }
}

impl ContentProvider for DirectoryProvider {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn list_documents(&self) -> Result<Vec<ContentRef>, ProviderError> {
        let items = self.walk()?;
        let mut known = self.known.write();
        known.clear();

        let mut documents = Vec::with_capacity(items.len());
        for item in items.keys() {
            let content = self.content_ref(item);
            known.insert(content.uuid.clone(), item.clone());
            documents.push(content);
        }
        Ok(documents)
    }

    fn indexable_data(
        &self,
        content: &ContentRef,
    ) -> Result<BTreeMap<String, String>, ProviderError> {
        let item = self.resolve(content)?;
        let absolute = self.root.join(&item);
        let parent = absolute.parent().unwrap_or(&self.root);
        let stem = absolute.file_name().map(|n| n.to_os_string()).unwrap_or_default();

        let entries = std::fs::read_dir(parent).map_err(|source| ProviderError::Io {
            path: parent.display().to_string(),
            source,
        })?;

        let mut data = BTreeMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.file_stem() != Some(stem.as_os_str()) {
                continue;
            }
            let Some(extension) = self.included_extension(&path) else {
                continue;
            };
            let text = std::fs::read_to_string(&path).map_err(|source| ProviderError::Io {
                path: path.display().to_string(),
                source,
            })?;
            data.insert(extension, text);
        }

        if data.is_empty() {
            return Err(ProviderError::NotFound(content.clone()));
        }
        Ok(data)
    }

    fn tags(&self, _content: &ContentRef) -> Vec<String> {
        self.tags.clone()
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Stable identifier for an item path, independent of the root location.
pub fn item_uuid(item: &Path) -> String {
    let mut hasher = DefaultHasher::new();
    for component in item.components() {
        component.as_os_str().to_string_lossy().hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}
