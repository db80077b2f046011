//! freightbill-domain
//!
//! Pure domain models for freight financial documents (ChargeLine,
//! FinancialDocument, DocumentStatus, DocumentKind, money helpers).
//! No I/O, no storage. Only data types and core enums.

pub mod charge;
pub mod document;
pub mod kind;
pub mod money;
pub mod status;

pub use charge::*;
pub use document::*;
pub use kind::*;
pub use money::*;
pub use status::*;
