//! Billable line items carried on invoices and receipts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One billable row on a financial document.
///
/// Owned exclusively by the document that contains it; never shared across
/// documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub description: String,
    pub rate: Decimal,
    pub quantity: u32,
    /// Line amount. Defaults to `rate * quantity`; may be overridden when a
    /// negotiated lump sum differs from the computed value.
    pub amount: Decimal,
    pub taxable: bool,
}

impl ChargeLine {
    /// Builds a line with the amount derived from `rate * quantity`.
    pub fn new(description: impl Into<String>, rate: Decimal, quantity: u32, taxable: bool) -> Self {
        Self {
            description: description.into(),
            rate,
            quantity,
            amount: rate * Decimal::from(quantity),
            taxable,
        }
    }

    /// Replaces the derived amount with an explicit one.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn derived_amount(&self) -> Decimal {
        self.rate * Decimal::from(self.quantity)
    }
}

/// Partial update applied to an existing line; `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeLinePatch {
    pub description: Option<String>,
    pub rate: Option<Decimal>,
    pub quantity: Option<u32>,
    pub amount: Option<Decimal>,
    pub taxable: Option<bool>,
}

impl ChargeLinePatch {
    pub fn rate(value: Decimal) -> Self {
        Self {
            rate: Some(value),
            ..Self::default()
        }
    }

    pub fn quantity(value: u32) -> Self {
        Self {
            quantity: Some(value),
            ..Self::default()
        }
    }

    pub fn amount(value: Decimal) -> Self {
        Self {
            amount: Some(value),
            ..Self::default()
        }
    }
}
