//! Content identity and change events.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Stable identity of an indexable content item.
///
/// Equality and hashing use `(content_type, uuid)` only; `name` is display
/// metadata and may change without the item changing identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRef {
    #[serde(rename = "type")]
    pub content_type: String,
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ContentRef {
    pub fn new(content_type: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self { content_type: content_type.into(), uuid: uuid.into(), name: None }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl PartialEq for ContentRef {
    fn eq(&self, other: &Self) -> bool {
        self.content_type == other.content_type && self.uuid == other.uuid
    }
}

impl Eq for ContentRef {}

impl Hash for ContentRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_type.hash(state);
        self.uuid.hash(state);
    }
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} '{}' ({})", self.content_type, name, self.uuid),
            None => write!(f, "{} {}", self.content_type, self.uuid),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    Create,
    Update,
    Delete,
}

impl ContentAction {
    /// Whether existing documents for the item are removed first.
    pub fn deletes(&self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    /// Whether fresh documents are added for the item.
    pub fn adds(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

/// A change to one content item, delivered by an entity event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEvent {
    pub content: ContentRef,
    pub action: ContentAction,
}

impl ContentEvent {
    pub fn new(content: ContentRef, action: ContentAction) -> Self {
        Self { content, action }
    }

    pub fn create(content: ContentRef) -> Self {
        Self::new(content, ContentAction::Create)
    }

    pub fn update(content: ContentRef) -> Self {
        Self::new(content, ContentAction::Update)
    }

    pub fn delete(content: ContentRef) -> Self {
        Self::new(content, ContentAction::Delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_name() {
        let a = ContentRef::new("pipeline", "1").with_name("First");
        let b = ContentRef::new("pipeline", "1").with_name("Renamed");
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_identity_uses_type() {
        assert_ne!(ContentRef::new("pipeline", "1"), ContentRef::new("script", "1"));
    }

    #[test]
    fn test_action_phases() {
        assert!(ContentAction::Update.deletes() && ContentAction::Update.adds());
        assert!(!ContentAction::Create.deletes());
        assert!(!ContentAction::Delete.adds());
    }

    #[test]
    fn test_serializes_type_field() {
        let json = serde_json::to_string(&ContentRef::new("script", "abc")).unwrap();
        assert!(json.contains(r#""type":"script""#));
    }
}
