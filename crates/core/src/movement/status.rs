//! Movement status shared by every family.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a movement header.
///
/// The valid transitions are:
/// - Draft → Completed
/// - Draft → Cancelled
///
/// Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    /// Open for line-item edits. Rejects call this state `pending`.
    Draft,
    /// Finalized.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl MovementStatus {
    /// Returns the canonical string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status, accepting `pending` as the draft state.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" | "pending" => Some(Self::Draft),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns true if line items may still be added, edited, or removed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
