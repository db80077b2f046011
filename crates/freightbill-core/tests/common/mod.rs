//! Shared fixtures for lifecycle and session suites.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use freightbill_core::{
    Clock, CoreError, DocumentLifecycle, InMemoryStore, LifecycleConfig, RecordStore,
    SequentialNumberSource,
};

/// Test clock advanced by hand.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("clock mutex");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex")
    }
}

/// Store wrapper that can be switched into a failing mode, either for all
/// operations or for deletes alone.
pub struct FlakyStore {
    inner: InMemoryStore,
    failing: AtomicBool,
    failing_deletes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            failing: AtomicBool::new(false),
            failing_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_deletes(&self, failing: bool) {
        self.failing_deletes.store(failing, Ordering::SeqCst);
    }

    pub fn record_count(&self, collection: &str) -> usize {
        self.inner.record_count(collection)
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CoreError::store("store unavailable"))
        } else {
            Ok(())
        }
    }
}

impl RecordStore for FlakyStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, CoreError> {
        self.check()?;
        self.inner.get(collection, key)
    }

    fn put(&self, collection: &str, key: &str, record: Value) -> Result<(), CoreError> {
        self.check()?;
        self.inner.put(collection, key, record)
    }

    fn delete(&self, collection: &str, key: &str) -> Result<(), CoreError> {
        self.check()?;
        if self.failing_deletes.load(Ordering::SeqCst) {
            return Err(CoreError::store("delete rejected"));
        }
        self.inner.delete(collection, key)
    }

    fn list_all(&self, collection: &str) -> Result<Vec<Value>, CoreError> {
        self.check()?;
        self.inner.list_all(collection)
    }
}

pub fn fixed_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("timestamp")
}

pub fn lifecycle_with(
    store: Arc<dyn RecordStore>,
    clock: Arc<ManualClock>,
) -> DocumentLifecycle {
    DocumentLifecycle::new(
        store,
        Arc::new(SequentialNumberSource::new()),
        clock,
        LifecycleConfig::default(),
    )
}
