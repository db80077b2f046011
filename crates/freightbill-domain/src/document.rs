//! The invoice/receipt aggregate and its derived totals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    charge::ChargeLine,
    kind::DocumentKind,
    money::{round_display, CurrencyCode},
    status::DocumentStatus,
};

/// An invoice or receipt: line items plus discount/settlement state.
///
/// Identity rule: `id` and `document_number` are absent until the first full
/// save and stable afterwards. Exactly one of "unsaved draft" (`id` absent,
/// `draft_timestamp` may be set) or "persisted document" (`id` present,
/// `draft_timestamp` absent) holds at any time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    #[serde(default)]
    pub lines: Vec<ChargeLine>,
    pub discount: Decimal,
    pub settled_amount: Decimal,
    #[serde(default)]
    pub currency: CurrencyCode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_timestamp: Option<DateTime<Utc>>,
}

impl FinancialDocument {
    /// Fresh unsaved document in `Draft` status.
    pub fn new(kind: DocumentKind, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            document_number: None,
            kind,
            status: DocumentStatus::Draft,
            lines: Vec::new(),
            discount: Decimal::ZERO,
            settled_amount: Decimal::ZERO,
            currency: CurrencyCode::default(),
            created_at: now,
            updated_at: now,
            draft_timestamp: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Monetary totals derived from a document's line set.
///
/// Every field is rounded to two fractional digits, half-up, at
/// construction; see [`DocumentTotals::compute`] for the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub gross_total: Decimal,
    pub balance: Decimal,
}

impl DocumentTotals {
    /// Derives totals from `lines` with caller-supplied discount, settlement,
    /// and flat tax rate.
    ///
    /// The sums run at full precision; rounding happens once per component
    /// (`subtotal`, `tax_amount`, discount, settlement) and the aggregate
    /// fields are derived from the rounded components, so
    /// `gross_total == net_amount + tax_amount` and
    /// `balance == gross_total - settled_amount` hold exactly even when the
    /// full-precision values straddle a half-cent.
    ///
    /// `net_amount` is deliberately not floored at zero: a discount larger
    /// than the subtotal is a credit note, and the negative value must
    /// survive.
    pub fn compute(
        lines: &[ChargeLine],
        discount: Decimal,
        settled_amount: Decimal,
        tax_rate: Decimal,
    ) -> Self {
        let raw_subtotal: Decimal = lines.iter().map(|line| line.amount).sum();
        let taxable_base: Decimal = lines
            .iter()
            .filter(|line| line.taxable)
            .map(|line| line.amount)
            .sum();
        let subtotal = round_display(raw_subtotal);
        let tax_amount = round_display(tax_rate * taxable_base);
        let net_amount = subtotal - round_display(discount);
        let gross_total = net_amount + tax_amount;
        let balance = gross_total - round_display(settled_amount);
        Self {
            subtotal,
            tax_amount,
            net_amount,
            gross_total,
            balance,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.balance.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn decimal(text: &str) -> Decimal {
        Decimal::from_str(text).expect("decimal literal")
    }

    #[test]
    fn totals_reconcile_for_mixed_taxable_lines() {
        let lines = vec![
            ChargeLine::new("Ocean Freight", decimal("500"), 1, true),
            ChargeLine::new("Documentation Fee", decimal("50"), 2, false),
        ];
        let totals =
            DocumentTotals::compute(&lines, decimal("20"), Decimal::ZERO, decimal("0.16"));
        assert_eq!(totals.subtotal, decimal("600"));
        assert_eq!(totals.tax_amount, decimal("80"));
        assert_eq!(totals.net_amount, decimal("580"));
        assert_eq!(totals.gross_total, decimal("660"));
        assert_eq!(totals.balance, decimal("660"));
    }

    #[test]
    fn oversized_discount_yields_negative_net() {
        let lines = vec![ChargeLine::new("Demurrage refund", decimal("100"), 1, false)];
        let totals =
            DocumentTotals::compute(&lines, decimal("150"), Decimal::ZERO, decimal("0.16"));
        assert_eq!(totals.net_amount, decimal("-50"));
        assert_eq!(totals.gross_total, decimal("-50"));
    }

    #[test]
    fn totals_reconcile_on_sub_cent_amounts() {
        // A 0.105 taxable line at 16% puts net (0.105) and tax (0.0168) on
        // opposite sides of a half-cent; the aggregates must be built from
        // the rounded components so the identities still hold.
        let lines = vec![ChargeLine::new("Fraction", decimal("0.105"), 1, true)];
        let totals =
            DocumentTotals::compute(&lines, Decimal::ZERO, Decimal::ZERO, decimal("0.16"));
        assert_eq!(totals.subtotal, decimal("0.11"));
        assert_eq!(totals.tax_amount, decimal("0.02"));
        assert_eq!(totals.net_amount, decimal("0.11"));
        assert_eq!(totals.gross_total, totals.net_amount + totals.tax_amount);
        assert_eq!(totals.gross_total, decimal("0.13"));
        assert_eq!(totals.balance, totals.gross_total);
    }

    #[test]
    fn rounding_applies_only_at_the_boundary() {
        // Three lines of 0.105 each: full-precision sum is 0.315, which must
        // round once to 0.32 rather than summing per-line roundings (0.33).
        let lines = vec![
            ChargeLine::new("a", decimal("0.105"), 1, false),
            ChargeLine::new("b", decimal("0.105"), 1, false),
            ChargeLine::new("c", decimal("0.105"), 1, false),
        ];
        let totals =
            DocumentTotals::compute(&lines, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(totals.subtotal, decimal("0.32"));
    }

    #[test]
    fn document_round_trips_through_json() {
        let now = Utc::now();
        let mut document = FinancialDocument::new(DocumentKind::SeaExportInvoice, now);
        document.lines.push(ChargeLine::new(
            "Ocean Freight",
            decimal("500"),
            1,
            true,
        ));
        document.discount = decimal("20");

        let json = serde_json::to_string(&document).expect("serialize");
        let restored: FinancialDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, document);

        let config = document.kind.config();
        let before = DocumentTotals::compute(
            &document.lines,
            document.discount,
            document.settled_amount,
            config.tax_rate,
        );
        let after = DocumentTotals::compute(
            &restored.lines,
            restored.discount,
            restored.settled_amount,
            config.tax_rate,
        );
        assert_eq!(before, after);
    }
}
