//! Shared cache of finished schema documents.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::assembler::SchemaDocument;

/// Root identity to finished document map, safe to share across threads.
///
/// Documents are inserted whole once their generation completes; a partially
/// built document is never visible. When two threads finish the same root,
/// the first insert wins and both callers get that document.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use typeschema_engine::{DocumentCache, SchemaDocument, SchemaDraft};
///
/// let cache = DocumentCache::new();
/// let first = SchemaDocument::new(json!({"type": "string"}), SchemaDraft::Draft07);
/// let second = SchemaDocument::new(json!({"type": "integer"}), SchemaDraft::Draft07);
///
/// cache.insert("a.Name", first.clone());
/// let kept = cache.insert("a.Name", second);
/// assert_eq!(kept, first);
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: RwLock<HashMap<String, SchemaDocument>>,
}

impl DocumentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached document of a root, if any.
    pub fn get(&self, root: &str) -> Option<SchemaDocument> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        documents.get(root).cloned()
    }

    /// Caches a document unless one is already present, returning the cached
    /// one.
    pub fn insert(&self, root: &str, document: SchemaDocument) -> SchemaDocument {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        documents
            .entry(root.to_string())
            .or_insert(document)
            .clone()
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached document.
    pub fn clear(&self) {
        self.documents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use serde_json::json;

    use super::*;
    use crate::config::SchemaDraft;

    #[test]
    fn test_get_missing() {
        let cache = DocumentCache::new();
        assert!(cache.get("a.Missing").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_inserts_keep_one_document() {
        let cache = Arc::new(DocumentCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let doc = SchemaDocument::new(json!({ "n": i }), SchemaDraft::Draft07);
                    cache.insert("a.Root", doc)
                })
            })
            .collect();

        let results: Vec<SchemaDocument> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = cache.get("a.Root").unwrap();
        assert!(results.iter().all(|doc| *doc == cached));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
