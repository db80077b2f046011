//! Document kinds and their per-kind lifecycle/tax configuration.
//!
//! The forms this engine serves (sea/air export and import invoices and
//! receipts) share one ledger and one state machine; everything that varies
//! between them lives in [`KindConfig`] so the engine itself stays generic.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::status::DocumentStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    SeaExportInvoice,
    SeaImportInvoice,
    AirExportInvoice,
    AirImportReceipt,
    SeaImportReceipt,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        DocumentKind::SeaExportInvoice,
        DocumentKind::SeaImportInvoice,
        DocumentKind::AirExportInvoice,
        DocumentKind::AirImportReceipt,
        DocumentKind::SeaImportReceipt,
    ];

    /// Stable lowercase identifier used in store keys.
    pub fn slug(self) -> &'static str {
        match self {
            DocumentKind::SeaExportInvoice => "se-invoice",
            DocumentKind::SeaImportInvoice => "si-invoice",
            DocumentKind::AirExportInvoice => "ae-invoice",
            DocumentKind::AirImportReceipt => "ai-receipt",
            DocumentKind::SeaImportReceipt => "si-receipt",
        }
    }

    pub fn config(self) -> &'static KindConfig {
        match self {
            DocumentKind::SeaExportInvoice => &SE_INVOICE,
            DocumentKind::SeaImportInvoice => &SI_INVOICE,
            DocumentKind::AirExportInvoice => &AE_INVOICE,
            DocumentKind::AirImportReceipt => &AI_RECEIPT,
            DocumentKind::SeaImportReceipt => &SI_RECEIPT,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentKind::SeaExportInvoice => "Sea Export Invoice",
            DocumentKind::SeaImportInvoice => "Sea Import Invoice",
            DocumentKind::AirExportInvoice => "Air Export Invoice",
            DocumentKind::AirImportReceipt => "Air Import Receipt",
            DocumentKind::SeaImportReceipt => "Sea Import Receipt",
        };
        f.write_str(label)
    }
}

/// Everything that varies per document kind.
#[derive(Debug, Clone)]
pub struct KindConfig {
    /// Status a first full save moves the document to.
    pub finalize_status: DocumentStatus,
    /// The subset of the state machine this kind uses.
    pub allowed_statuses: &'static [DocumentStatus],
    /// Flat tax rate applied to taxable lines. The observed business rule is
    /// a single per-kind rate rather than per-line rates; kept verbatim.
    pub tax_rate: Decimal,
    /// Whether settlement (`settled_amount`/`balance`) gates the terminal
    /// `Settled`/`Closed` transitions.
    pub tracks_settlement: bool,
    /// Final-collection name in the record store.
    pub collection: &'static str,
    /// Prefix for generated document numbers.
    pub number_prefix: &'static str,
}

impl KindConfig {
    pub fn allows(&self, status: DocumentStatus) -> bool {
        self.allowed_statuses.contains(&status)
    }
}

// 16% flat rate observed across all invoice/receipt forms.
const FLAT_TAX_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

const INVOICE_STATUSES: &[DocumentStatus] = &[
    DocumentStatus::Draft,
    DocumentStatus::Submitted,
    DocumentStatus::Settled,
    DocumentStatus::Cancelled,
];

const ISSUED_INVOICE_STATUSES: &[DocumentStatus] = &[
    DocumentStatus::Draft,
    DocumentStatus::Issued,
    DocumentStatus::Settled,
    DocumentStatus::Cancelled,
];

const RECEIPT_STATUSES: &[DocumentStatus] = &[
    DocumentStatus::Draft,
    DocumentStatus::Finalized,
    DocumentStatus::Settled,
    DocumentStatus::Closed,
    DocumentStatus::Cancelled,
];

static SE_INVOICE: KindConfig = KindConfig {
    finalize_status: DocumentStatus::Submitted,
    allowed_statuses: INVOICE_STATUSES,
    tax_rate: FLAT_TAX_RATE,
    tracks_settlement: true,
    collection: "se_invoices",
    number_prefix: "SEI",
};

static SI_INVOICE: KindConfig = KindConfig {
    finalize_status: DocumentStatus::Submitted,
    allowed_statuses: INVOICE_STATUSES,
    tax_rate: FLAT_TAX_RATE,
    tracks_settlement: true,
    collection: "si_invoices",
    number_prefix: "SII",
};

static AE_INVOICE: KindConfig = KindConfig {
    finalize_status: DocumentStatus::Issued,
    allowed_statuses: ISSUED_INVOICE_STATUSES,
    tax_rate: FLAT_TAX_RATE,
    tracks_settlement: true,
    collection: "ae_invoices",
    number_prefix: "AEI",
};

static AI_RECEIPT: KindConfig = KindConfig {
    finalize_status: DocumentStatus::Finalized,
    allowed_statuses: RECEIPT_STATUSES,
    tax_rate: FLAT_TAX_RATE,
    tracks_settlement: true,
    collection: "ai_receipts",
    number_prefix: "AIR",
};

static SI_RECEIPT: KindConfig = KindConfig {
    finalize_status: DocumentStatus::Finalized,
    allowed_statuses: RECEIPT_STATUSES,
    tax_rate: FLAT_TAX_RATE,
    tracks_settlement: true,
    collection: "si_receipts",
    number_prefix: "SIR",
};
