//! The caller-facing editing surface: one session per in-memory document.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use freightbill_domain::{
    ChargeLine, ChargeLinePatch, DocumentStatus, DocumentTotals, FinancialDocument,
};

use crate::{
    ledger::ChargeLedger,
    lifecycle::{DocumentLifecycle, LoadedDocument},
    store::DraftKey,
    CoreError,
};

/// One editing session owning one [`FinancialDocument`] and its ledger.
///
/// Single-owner by design: no locking, and no other session may mutate the
/// same in-memory document. Concurrent sessions against the same *persisted*
/// document are last-writer-wins on [`EditSession::save_final`]. Ending a
/// session is just dropping it — the caller must stop its autosave timer;
/// drop never saves implicitly.
pub struct EditSession {
    lifecycle: DocumentLifecycle,
    key: DraftKey,
    document: FinancialDocument,
    ledger: ChargeLedger,
    dirty: bool,
    last_autosave_attempt: Option<DateTime<Utc>>,
}

impl EditSession {
    /// Opens a session for `key` via the lifecycle's lookup order
    /// (unexpired draft, persisted record, fresh default).
    pub fn open(lifecycle: DocumentLifecycle, key: DraftKey) -> Result<Self, CoreError> {
        let LoadedDocument { document, .. } = lifecycle.load_for_edit(key)?;
        let ledger = ChargeLedger::from_lines(document.lines.clone());
        Ok(Self {
            lifecycle,
            key,
            document,
            ledger,
            dirty: false,
            last_autosave_attempt: None,
        })
    }

    pub fn key(&self) -> DraftKey {
        self.key
    }

    pub fn document(&self) -> &FinancialDocument {
        &self.document
    }

    pub fn current_status(&self) -> DocumentStatus {
        self.document.status
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Totals for the current line set, computed fresh on every call.
    pub fn totals(&self) -> DocumentTotals {
        self.ledger.compute_totals(
            self.document.discount,
            self.document.settled_amount,
            self.document.kind.config().tax_rate,
        )
    }

    pub fn add_line(&mut self, line: ChargeLine) -> Result<usize, CoreError> {
        let index = self.ledger.add_line(line)?;
        self.sync_lines();
        Ok(index)
    }

    pub fn update_line(&mut self, index: usize, patch: ChargeLinePatch) -> Result<(), CoreError> {
        self.ledger.update_line(index, patch)?;
        self.sync_lines();
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<ChargeLine, CoreError> {
        let removed = self.ledger.remove_line(index)?;
        self.sync_lines();
        Ok(removed)
    }

    pub fn set_discount(&mut self, discount: Decimal) -> Result<(), CoreError> {
        if discount < Decimal::ZERO {
            return Err(CoreError::validation("discount cannot be negative"));
        }
        self.document.discount = discount;
        self.dirty = true;
        Ok(())
    }

    pub fn set_settled_amount(&mut self, settled_amount: Decimal) -> Result<(), CoreError> {
        if settled_amount < Decimal::ZERO {
            return Err(CoreError::validation("settled amount cannot be negative"));
        }
        self.document.settled_amount = settled_amount;
        self.dirty = true;
        Ok(())
    }

    /// Requests a status change; on failure the status is unchanged.
    pub fn request_transition(&mut self, to: DocumentStatus) -> Result<(), CoreError> {
        let totals = self.totals();
        self.lifecycle
            .request_transition(&mut self.document, to, &totals)?;
        self.dirty = true;
        Ok(())
    }

    /// Explicit draft save; surfaces store errors to the caller.
    pub fn save_draft(&mut self) -> Result<(), CoreError> {
        self.lifecycle.save_draft(&self.document, self.key)?;
        self.dirty = false;
        Ok(())
    }

    /// Full save; assigns identity on first save and clears the draft slot.
    /// After a successful first save the session is re-keyed to the persisted
    /// record so later draft saves land in the edit slot.
    pub fn save_final(&mut self) -> Result<(), CoreError> {
        self.lifecycle.save_final(&mut self.document, self.key)?;
        if let Some(id) = self.document.id {
            self.key = DraftKey::existing(self.document.kind, id);
        }
        self.dirty = false;
        Ok(())
    }

    /// Periodic autosave hook, driven by the caller's timer.
    ///
    /// Saves a draft iff the session is dirty and the configured interval has
    /// elapsed since the last attempt. A store failure is logged and the
    /// dirty flag kept, so the next tick retries; it is never surfaced to the
    /// editing caller. Returns whether a save was attempted.
    pub fn autosave_tick(&mut self, now: DateTime<Utc>) -> bool {
        if !self.dirty {
            return false;
        }
        let interval = self.lifecycle.config().autosave_interval();
        if let Some(last) = self.last_autosave_attempt {
            if now - last < interval {
                return false;
            }
        }
        self.last_autosave_attempt = Some(now);
        match self.lifecycle.save_draft(&self.document, self.key) {
            Ok(()) => {
                self.dirty = false;
                true
            }
            Err(err) => {
                warn!(key = %self.key.storage_key(), %err, "autosave failed; will retry");
                true
            }
        }
    }

    // Timestamps stay with the lifecycle: mutation marks the session dirty
    // but `updated_at` moves only on a full save.
    fn sync_lines(&mut self) {
        self.document.lines = self.ledger.lines().to_vec();
        self.dirty = true;
    }
}
