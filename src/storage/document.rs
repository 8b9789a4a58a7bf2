use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::{StoreError, StoreResult};

pub type Document = serde_json::Map<String, JsonValue>;

/// Named collections of JSON documents keyed by document id.
/// Collections are created on first write; ids iterate in sorted order.
#[derive(Clone)]
pub struct DocumentStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Document>>>>,
    online: Arc<AtomicBool>,
}

impl Default for DocumentStore {
    fn default() -> Self { Self::new() }
}

fn to_document(location: &str, value: JsonValue) -> StoreResult<Document> {
    match value {
        JsonValue::Object(map) => Ok(map),
        other => Err(StoreError::Corrupt {
            location: location.to_string(),
            detail: format!("expected a JSON object, got {}", other),
        }),
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self { collections: Arc::new(RwLock::new(HashMap::new())), online: Arc::new(AtomicBool::new(true)) }
    }

    /// Toggle connectivity. While offline every operation fails with `StoreError::Unavailable`.
    pub fn set_online(&self, online: bool) { self.online.store(online, Ordering::SeqCst); }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) { Ok(()) } else { Err(StoreError::Unavailable("document store offline".into())) }
    }

    pub fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.ensure_online()?;
        Ok(self.collections.read().get(collection).and_then(|c| c.get(id)).cloned())
    }

    pub fn get_as<T: DeserializeOwned>(&self, collection: &str, id: &str) -> StoreResult<Option<T>> {
        match self.get(collection, id)? {
            Some(doc) => Ok(Some(serde_json::from_value(JsonValue::Object(doc))?)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, collection: &str, id: &str) -> StoreResult<bool> {
        Ok(self.get(collection, id)?.is_some())
    }

    /// Create or overwrite a document.
    pub fn set(&self, collection: &str, id: &str, doc: Document) -> StoreResult<()> {
        self.ensure_online()?;
        self.collections.write().entry(collection.to_string()).or_default().insert(id.to_string(), doc);
        Ok(())
    }

    pub fn set_as<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> StoreResult<()> {
        let doc = to_document(&format!("{}/{}", collection, id), serde_json::to_value(value)?)?;
        self.set(collection, id, doc)
    }

    /// Merge `fields` into an existing document. Missing documents are an error.
    pub fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()> {
        self.ensure_online()?;
        let mut guard = self.collections.write();
        let doc = guard
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound { collection: collection.to_string(), id: id.to_string() })?;
        for (k, v) in fields {
            doc.insert(k, v);
        }
        Ok(())
    }

    /// Read-modify-write a typed document under the collection write lock.
    /// The document is written back only when `f` returns `Ok`.
    pub fn update_with<T, R, E, F>(&self, collection: &str, id: &str, f: F) -> StoreResult<Result<R, E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut T) -> Result<R, E>,
    {
        self.ensure_online()?;
        let mut guard = self.collections.write();
        let slot = guard
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::NotFound { collection: collection.to_string(), id: id.to_string() })?;
        let mut value: T = serde_json::from_value(JsonValue::Object(slot.clone()))?;
        match f(&mut value) {
            Ok(r) => {
                *slot = to_document(&format!("{}/{}", collection, id), serde_json::to_value(&value)?)?;
                Ok(Ok(r))
            }
            Err(e) => Ok(Err(e)),
        }
    }

    /// Returns true if a document was removed.
    pub fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.ensure_online()?;
        Ok(self.collections.write().get_mut(collection).map(|c| c.remove(id).is_some()).unwrap_or(false))
    }

    /// Every document of a collection as (id, document) pairs.
    pub fn stream(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        self.ensure_online()?;
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    /// Documents whose fields equal every (field, value) filter.
    pub fn query_eq(&self, collection: &str, filters: &[(&str, JsonValue)]) -> StoreResult<Vec<(String, Document)>> {
        self.ensure_online()?;
        let guard = self.collections.read();
        let Some(c) = guard.get(collection) else { return Ok(Vec::new()); };
        Ok(c.iter()
            .filter(|(_, doc)| filters.iter().all(|(f, v)| doc.get(*f) == Some(v)))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map(|c| c.len()).unwrap_or(0)
    }
}
