use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::{Document, DocumentStore, TableStore};

/// Initial store contents loaded from a JSON file:
///
/// ```json
/// { "tables": { "hospitals": [ { "hospital_id": 7, "name": "Central Clinic" } ] },
///   "collections": { "admins": { "7": { "hospital_id": 7, "password": "secret" } } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub tables: HashMap<String, Vec<JsonValue>>,
    #[serde(default)]
    pub collections: HashMap<String, HashMap<String, Document>>,
}

impl SeedData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading seed file {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing seed file {}", path.display()))
    }

    /// Write every table item and document into the stores. Returns (items, documents) written.
    pub fn apply(self, tables: &TableStore, documents: &DocumentStore) -> Result<(usize, usize)> {
        let mut items = 0usize;
        let mut docs = 0usize;
        for (table, rows) in self.tables {
            for row in rows {
                tables.put_item(&table, row).with_context(|| format!("seeding table {}", table))?;
                items += 1;
            }
        }
        for (collection, entries) in self.collections {
            for (id, doc) in entries {
                documents.set(&collection, &id, doc).with_context(|| format!("seeding {}/{}", collection, id))?;
                docs += 1;
            }
        }
        tracing::info!(target: "store", items, docs, "seed data applied");
        Ok((items, docs))
    }
}
