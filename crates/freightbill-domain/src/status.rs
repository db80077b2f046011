//! Lifecycle states shared by every financial document kind.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Enumerates the lifecycle state of a financial document.
///
/// Not every kind uses every state; each [`crate::DocumentKind`] declares its
/// own valid subset. `Settled`, `Closed`, and `Cancelled` are terminal for
/// all kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Issued,
    Finalized,
    Settled,
    Closed,
    Cancelled,
}

impl DocumentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DocumentStatus::Settled | DocumentStatus::Closed | DocumentStatus::Cancelled
        )
    }

    /// True for states a document reaches on its first full save.
    pub fn is_finalized_form(self) -> bool {
        matches!(
            self,
            DocumentStatus::Submitted | DocumentStatus::Issued | DocumentStatus::Finalized
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Submitted => "Submitted",
            DocumentStatus::Issued => "Issued",
            DocumentStatus::Finalized => "Finalized",
            DocumentStatus::Settled => "Settled",
            DocumentStatus::Closed => "Closed",
            DocumentStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}
