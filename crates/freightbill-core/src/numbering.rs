//! Document-number assignment, consumed exactly once per document at its
//! first full save.

use std::{collections::HashMap, sync::Mutex};

use freightbill_domain::DocumentKind;

use crate::CoreError;

/// Produces the next document number for a kind.
///
/// The lifecycle calls this at most once per document; an idempotent re-save
/// never regenerates a number.
pub trait NumberSource: Send + Sync {
    fn next(&self, kind: DocumentKind) -> Result<String, CoreError>;
}

/// Per-kind monotonic counter formatted as `{prefix}-{seq:05}`.
#[derive(Debug, Default)]
pub struct SequentialNumberSource {
    counters: Mutex<HashMap<DocumentKind, u32>>,
}

impl SequentialNumberSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a kind's counter, e.g. after scanning existing records.
    pub fn seed(&self, kind: DocumentKind, last_used: u32) {
        let mut counters = self.counters.lock().expect("counter mutex poisoned");
        let entry = counters.entry(kind).or_insert(0);
        *entry = (*entry).max(last_used);
    }
}

impl NumberSource for SequentialNumberSource {
    fn next(&self, kind: DocumentKind) -> Result<String, CoreError> {
        let mut counters = self.counters.lock().expect("counter mutex poisoned");
        let counter = counters.entry(kind).or_insert(0);
        *counter += 1;
        Ok(format!("{}-{:05}", kind.config().number_prefix, counter))
    }
}
