//! The persistence seam: a named-collection key-value contract plus the
//! draft-slot schema layered on top of it.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use freightbill_domain::{DocumentKind, FinancialDocument};

use crate::CoreError;

/// Collection holding every in-progress draft slot, regardless of kind.
/// Final documents live in the per-kind collections from `KindConfig`.
pub const DRAFTS_COLLECTION: &str = "drafts";

/// Abstraction over persistence backends holding named collections of
/// JSON-serializable records. Records are opaque to the backend; all schema
/// meaning stays in the core.
pub trait RecordStore: Send + Sync {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, CoreError>;
    fn put(&self, collection: &str, key: &str, record: Value) -> Result<(), CoreError>;
    fn delete(&self, collection: &str, key: &str) -> Result<(), CoreError>;
    fn list_all(&self, collection: &str) -> Result<Vec<Value>, CoreError>;
}

/// Whether an editing session started from a blank form or an existing record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EditMode {
    New,
    Edit,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditMode::New => "new",
            EditMode::Edit => "edit",
        })
    }
}

/// Identifies one editing session's draft slot.
///
/// At most one live slot exists per key; repeated draft saves overwrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub kind: DocumentKind,
    pub mode: EditMode,
    pub record_id: Option<Uuid>,
}

impl DraftKey {
    pub fn new_document(kind: DocumentKind) -> Self {
        Self {
            kind,
            mode: EditMode::New,
            record_id: None,
        }
    }

    pub fn existing(kind: DocumentKind, record_id: Uuid) -> Self {
        Self {
            kind,
            mode: EditMode::Edit,
            record_id: Some(record_id),
        }
    }

    /// Store key string, e.g. `se-invoice:edit:5f0c...` or `ai-receipt:new:NEW`.
    pub fn storage_key(&self) -> String {
        match self.record_id {
            Some(id) => format!("{}:{}:{}", self.kind.slug(), self.mode, id),
            None => format!("{}:{}:NEW", self.kind.slug(), self.mode),
        }
    }
}

/// Ephemeral snapshot of a document mid-edit, bounded by the draft TTL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftSlot {
    pub saved_at: DateTime<Utc>,
    pub document: FinancialDocument,
}

impl DraftSlot {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.saved_at > ttl
    }
}

/// HashMap-backed store for tests and in-process embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .expect("store mutex poisoned")
            .get(collection)
            .map(|records| records.len())
            .unwrap_or(0)
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, CoreError> {
        let collections = self.collections.lock().expect("store mutex poisoned");
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(key))
            .cloned())
    }

    fn put(&self, collection: &str, key: &str, record: Value) -> Result<(), CoreError> {
        let mut collections = self.collections.lock().expect("store mutex poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), CoreError> {
        let mut collections = self.collections.lock().expect("store mutex poisoned");
        if let Some(records) = collections.get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, CoreError> {
        let collections = self.collections.lock().expect("store mutex poisoned");
        Ok(collections
            .get(collection)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }
}
