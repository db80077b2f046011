//! freightbill-core
//!
//! Business logic for freight financial documents: the charge ledger, the
//! document lifecycle state machine, and the editing-session surface.
//! Depends on freightbill-domain. No UI, no direct filesystem access —
//! persistence goes through the [`store::RecordStore`] trait.

pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod numbering;
pub mod session;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use config::LifecycleConfig;
pub use error::CoreError;
pub use ledger::ChargeLedger;
pub use lifecycle::{DocumentLifecycle, LoadSource, LoadedDocument};
pub use numbering::{NumberSource, SequentialNumberSource};
pub use session::EditSession;
pub use store::{DraftKey, DraftSlot, EditMode, InMemoryStore, RecordStore, DRAFTS_COLLECTION};
