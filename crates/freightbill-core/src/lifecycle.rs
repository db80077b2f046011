//! Status state machine and the draft/final persistence flow.
//!
//! Known limitation: two sessions editing the *same* persisted document are
//! last-writer-wins on [`DocumentLifecycle::save_final`]; each session owns a
//! distinct draft key, so drafts never contend.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use freightbill_domain::{DocumentKind, DocumentStatus, DocumentTotals, FinancialDocument};

use crate::{
    clock::Clock,
    config::LifecycleConfig,
    numbering::NumberSource,
    store::{DraftKey, DraftSlot, RecordStore, DRAFTS_COLLECTION},
    CoreError,
};

/// Where `load_for_edit` found its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Draft,
    Final,
    Fresh,
}

/// A document plus the provenance of the bytes backing it.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: FinancialDocument,
    pub source: LoadSource,
}

/// Owns status transitions, identity assignment, and draft/final writes for
/// one document kind family.
pub struct DocumentLifecycle {
    store: Arc<dyn RecordStore>,
    numbers: Arc<dyn NumberSource>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl DocumentLifecycle {
    pub fn new(
        store: Arc<dyn RecordStore>,
        numbers: Arc<dyn NumberSource>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store,
            numbers,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Checks whether `from -> to` is legal for `kind` given the document's
    /// current `totals`. Pure; mutates nothing.
    pub fn validate_transition(
        kind: DocumentKind,
        from: DocumentStatus,
        to: DocumentStatus,
        totals: &DocumentTotals,
    ) -> Result<(), CoreError> {
        let config = kind.config();
        let reject = |reason: &str| {
            Err(CoreError::InvalidTransition {
                from,
                to,
                reason: reason.to_string(),
            })
        };

        if !config.allows(to) {
            return reject("status not used by this document kind");
        }
        if from == to {
            return Ok(());
        }
        if from.is_terminal() {
            return reject("document is in a terminal status");
        }
        if to == DocumentStatus::Cancelled {
            return Ok(());
        }
        match to {
            DocumentStatus::Submitted | DocumentStatus::Issued | DocumentStatus::Finalized => {
                if from != DocumentStatus::Draft {
                    return reject("only a draft can be finalized");
                }
                if to != config.finalize_status {
                    return reject("wrong finalize status for this document kind");
                }
                Ok(())
            }
            DocumentStatus::Settled | DocumentStatus::Closed => {
                if !from.is_finalized_form() {
                    return reject("document has not been finalized");
                }
                if config.tracks_settlement && !totals.is_settled() {
                    return reject("balance is not zero");
                }
                Ok(())
            }
            DocumentStatus::Draft => reject("cannot return to draft"),
            DocumentStatus::Cancelled => unreachable!("handled above"),
        }
    }

    /// Applies a status change in place, or fails leaving `document`
    /// untouched.
    pub fn request_transition(
        &self,
        document: &mut FinancialDocument,
        to: DocumentStatus,
        totals: &DocumentTotals,
    ) -> Result<(), CoreError> {
        Self::validate_transition(document.kind, document.status, to, totals)?;
        document.status = to;
        document.touch(self.clock.now());
        Ok(())
    }

    /// Writes the draft slot for `key`. Forces `Draft` status and stamps the
    /// draft timestamp; never touches the final collection. Idempotent.
    pub fn save_draft(
        &self,
        document: &FinancialDocument,
        key: DraftKey,
    ) -> Result<(), CoreError> {
        let now = self.clock.now();
        let mut snapshot = document.clone();
        snapshot.status = DocumentStatus::Draft;
        // The slot's `saved_at` drives expiry; the in-document marker is only
        // for records that have never been fully saved, so a persisted
        // document never carries both an id and a draft timestamp.
        if snapshot.id.is_none() {
            snapshot.draft_timestamp = Some(now);
        }

        let slot = DraftSlot {
            saved_at: now,
            document: snapshot,
        };
        let record = serde_json::to_value(&slot)?;
        self.store
            .put(DRAFTS_COLLECTION, &key.storage_key(), record)?;
        debug!(key = %key.storage_key(), "draft saved");
        Ok(())
    }

    /// Full save: validates the finalize transition, assigns identity on the
    /// first save, writes the final collection, then cleans up the draft.
    ///
    /// Identity is assigned exactly once: re-saving an already persisted
    /// document keeps its `id` and `document_number`. All changes are staged
    /// on a copy and committed to `document` only after the store confirms
    /// the write, so a failed save leaves the in-memory document exactly as
    /// it was. The draft slot is deleted only after the final write is
    /// confirmed, so a crash in between can leave a stale draft but never
    /// lose the final record.
    pub fn save_final(
        &self,
        document: &mut FinancialDocument,
        key: DraftKey,
    ) -> Result<(), CoreError> {
        let config = document.kind.config();
        let totals = DocumentTotals::compute(
            &document.lines,
            document.discount,
            document.settled_amount,
            config.tax_rate,
        );
        let mut staged = document.clone();
        if staged.status == DocumentStatus::Draft {
            Self::validate_transition(
                staged.kind,
                staged.status,
                config.finalize_status,
                &totals,
            )?;
            staged.status = config.finalize_status;
        }

        if staged.id.is_none() {
            staged.id = Some(Uuid::new_v4());
            staged.document_number = Some(self.numbers.next(staged.kind)?);
        }
        staged.draft_timestamp = None;
        staged.touch(self.clock.now());

        let id = staged.id.expect("id assigned above");
        let record = serde_json::to_value(&staged)?;
        self.store.put(config.collection, &id.to_string(), record)?;
        *document = staged;
        debug!(collection = config.collection, %id, "final record written");

        // The final write is committed; a failed draft cleanup must not turn
        // the save into an error.
        if let Err(err) = self.store.delete(DRAFTS_COLLECTION, &key.storage_key()) {
            warn!(key = %key.storage_key(), %err, "draft cleanup failed after final save");
        }
        Ok(())
    }

    /// Reads the best available document for `key`: unexpired draft first,
    /// then the persisted record, then a fresh default.
    ///
    /// Expiry is judged at read time; an expired slot is deleted here and the
    /// lookup falls through. Deterministic for a given store state.
    pub fn load_for_edit(&self, key: DraftKey) -> Result<LoadedDocument, CoreError> {
        let now = self.clock.now();
        if let Some(record) = self.store.get(DRAFTS_COLLECTION, &key.storage_key())? {
            let slot: DraftSlot = serde_json::from_value(record)?;
            if slot.is_expired(now, self.config.draft_ttl()) {
                // The fall-through sources may still be readable; a failed
                // cleanup only means the expired slot is judged again on the
                // next read.
                match self.store.delete(DRAFTS_COLLECTION, &key.storage_key()) {
                    Ok(()) => debug!(key = %key.storage_key(), "expired draft deleted"),
                    Err(err) => {
                        warn!(key = %key.storage_key(), %err, "expired draft cleanup failed")
                    }
                }
            } else {
                return Ok(LoadedDocument {
                    document: slot.document,
                    source: LoadSource::Draft,
                });
            }
        }

        if let Some(id) = key.record_id {
            let config = key.kind.config();
            let record = self
                .store
                .get(config.collection, &id.to_string())?
                .ok_or_else(|| {
                    CoreError::NotFound(format!("{} {id}", key.kind))
                })?;
            let document: FinancialDocument = serde_json::from_value(record)?;
            return Ok(LoadedDocument {
                document,
                source: LoadSource::Final,
            });
        }

        Ok(LoadedDocument {
            document: FinancialDocument::new(key.kind, now),
            source: LoadSource::Fresh,
        })
    }

    /// Lists every persisted (non-draft) document of `kind`.
    pub fn list_final(&self, kind: DocumentKind) -> Result<Vec<FinancialDocument>, CoreError> {
        let records = self.store.list_all(kind.config().collection)?;
        let mut documents = Vec::with_capacity(records.len());
        for record in records {
            documents.push(serde_json::from_value(record)?);
        }
        Ok(documents)
    }
}
