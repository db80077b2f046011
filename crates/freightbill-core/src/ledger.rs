//! Charge line bookkeeping for one financial document.

use rust_decimal::Decimal;

use freightbill_domain::{ChargeLine, ChargeLinePatch, DocumentTotals};

use crate::CoreError;

/// Owns the charge lines of one document and derives its monetary totals.
///
/// Totals are recomputed from scratch on demand; there is no cache, so a
/// caller can never observe totals that disagree with the current line set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeLedger {
    lines: Vec<ChargeLine>,
}

impl ChargeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<ChargeLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[ChargeLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<ChargeLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends a line and returns its index.
    ///
    /// The caller may pre-set an overridden `amount` (via
    /// [`ChargeLine::with_amount`]); otherwise the constructor has already
    /// derived it from `rate * quantity`.
    pub fn add_line(&mut self, line: ChargeLine) -> Result<usize, CoreError> {
        validate_line(&line)?;
        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    /// Merges `patch` into the line at `index`.
    ///
    /// The amount is re-derived whenever `rate` or `quantity` changes, unless
    /// the same patch also carries an explicit `amount`, which wins.
    pub fn update_line(&mut self, index: usize, patch: ChargeLinePatch) -> Result<(), CoreError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::IndexOutOfRange { index, len })?;

        let mut updated = line.clone();
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(rate) = patch.rate {
            updated.rate = rate;
        }
        if let Some(quantity) = patch.quantity {
            updated.quantity = quantity;
        }
        if let Some(taxable) = patch.taxable {
            updated.taxable = taxable;
        }
        match patch.amount {
            Some(amount) => updated.amount = amount,
            None => {
                if updated.rate != line.rate || updated.quantity != line.quantity {
                    updated.amount = updated.derived_amount();
                }
            }
        }
        validate_line(&updated)?;
        *line = updated;
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> Result<ChargeLine, CoreError> {
        if index >= self.lines.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Derives the document's totals for the given discount, settlement, and
    /// flat tax rate. Pure; see [`DocumentTotals::compute`].
    pub fn compute_totals(
        &self,
        discount: Decimal,
        settled_amount: Decimal,
        tax_rate: Decimal,
    ) -> DocumentTotals {
        DocumentTotals::compute(&self.lines, discount, settled_amount, tax_rate)
    }
}

fn validate_line(line: &ChargeLine) -> Result<(), CoreError> {
    if line.description.trim().is_empty() {
        return Err(CoreError::validation("charge line description is empty"));
    }
    if line.rate < Decimal::ZERO {
        return Err(CoreError::validation(format!(
            "charge line rate {} is negative",
            line.rate
        )));
    }
    if line.quantity < 1 {
        return Err(CoreError::validation("charge line quantity must be at least 1"));
    }
    Ok(())
}
