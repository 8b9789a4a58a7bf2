use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use super::{StoreError, StoreResult};

/// Item tables addressed by name. Reads are full scans with an optional
/// equality filter on one attribute; there are no secondary indexes.
#[derive(Clone)]
pub struct TableStore {
    tables: Arc<RwLock<HashMap<String, Vec<JsonValue>>>>,
    online: Arc<AtomicBool>,
}

impl Default for TableStore {
    fn default() -> Self { Self::new() }
}

impl TableStore {
    pub fn new() -> Self {
        Self { tables: Arc::new(RwLock::new(HashMap::new())), online: Arc::new(AtomicBool::new(true)) }
    }

    /// Toggle connectivity. While offline every operation fails with `StoreError::Unavailable`.
    pub fn set_online(&self, online: bool) { self.online.store(online, Ordering::SeqCst); }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) { Ok(()) } else { Err(StoreError::Unavailable("table store offline".into())) }
    }

    pub fn put_item(&self, table: &str, item: JsonValue) -> StoreResult<()> {
        self.ensure_online()?;
        if !item.is_object() {
            return Err(StoreError::Corrupt { location: table.to_string(), detail: "items must be JSON objects".into() });
        }
        self.tables.write().entry(table.to_string()).or_default().push(item);
        Ok(())
    }

    /// Return every item of `table` in insertion order. Unknown tables scan as empty.
    pub fn scan(&self, table: &str) -> StoreResult<Vec<JsonValue>> {
        self.ensure_online()?;
        Ok(self.tables.read().get(table).cloned().unwrap_or_default())
    }

    /// Scan `table` keeping items whose `attr` equals `value`.
    pub fn scan_eq(&self, table: &str, attr: &str, value: &JsonValue) -> StoreResult<Vec<JsonValue>> {
        self.ensure_online()?;
        let guard = self.tables.read();
        let Some(items) = guard.get(table) else { return Ok(Vec::new()); };
        Ok(items.iter().filter(|it| it.get(attr) == Some(value)).cloned().collect())
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.read().get(table).map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool { self.len(table) == 0 }
}
