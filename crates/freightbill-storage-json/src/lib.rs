//! freightbill-storage-json
//!
//! Filesystem JSON implementation of the core's [`RecordStore`] contract.
//! One file per collection under a caller-supplied root; writes are staged
//! to a temporary file and renamed so a crash never leaves a half-written
//! collection on disk.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde_json::Value;
use tracing::debug;

use freightbill_core::{CoreError, RecordStore};

const COLLECTION_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

type Collection = BTreeMap<String, Value>;

/// Directory-backed JSON record store.
///
/// The mutex serializes the read-modify-write cycle of `put`/`delete`; the
/// engine itself is single-session, but nothing stops a host application
/// from sharing one store across sessions for different documents.
pub struct JsonRecordStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.root
            .join(format!("{collection}.{COLLECTION_EXTENSION}"))
    }

    fn read_collection(&self, collection: &str) -> Result<Collection, CoreError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Collection::new());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write_collection(&self, collection: &str, records: &Collection) -> Result<(), CoreError> {
        let path = self.collection_path(collection);
        let json = serde_json::to_string_pretty(records)?;
        write_atomically(&path, &json)?;
        debug!(collection, records = records.len(), "collection written");
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, CoreError> {
        Ok(self.read_collection(collection)?.remove(key))
    }

    fn put(&self, collection: &str, key: &str, record: Value) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        let mut records = self.read_collection(collection)?;
        records.insert(key.to_string(), record);
        self.write_collection(collection, &records)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().expect("store mutex poisoned");
        let mut records = self.read_collection(collection)?;
        if records.remove(key).is_some() {
            self.write_collection(collection, &records)?;
        }
        Ok(())
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, CoreError> {
        Ok(self.read_collection(collection)?.into_values().collect())
    }
}

/// Stages to `<path>.tmp` then renames over the target.
fn write_atomically(path: &Path, contents: &str) -> Result<(), CoreError> {
    let tmp = path.with_extension(TMP_SUFFIX);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
