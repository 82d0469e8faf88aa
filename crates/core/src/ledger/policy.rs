//! Entry type policy.
//!
//! Static table mapping each entry type to its arithmetic direction and
//! structural requirements. `Reversal` is the one exception: its effective
//! direction is the inverse of the entry it reverses, so the factory (not
//! this table) decides its sign at construction time.

use serde::{Deserialize, Serialize};

use super::entry::EntryType;

/// Arithmetic direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Increases the amount the student owes.
    Debit,
    /// Decreases the amount the student owes.
    Credit,
}

impl EntryDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Policy for a single entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTypePolicy {
    /// Fixed direction, or `None` for `Reversal` (decided by the factory).
    pub direction: Option<EntryDirection>,
    /// Whether the entry must reference an existing entry.
    pub requires_related_entry: bool,
    /// Whether creating the entry requires elevated approval.
    pub requires_approval: bool,
}

impl EntryType {
    /// Returns the policy for this entry type.
    #[must_use]
    pub const fn policy(self) -> EntryTypePolicy {
        match self {
            Self::Charge => EntryTypePolicy {
                direction: Some(EntryDirection::Debit),
                requires_related_entry: false,
                requires_approval: false,
            },
            Self::Payment | Self::Credit => EntryTypePolicy {
                direction: Some(EntryDirection::Credit),
                requires_related_entry: false,
                requires_approval: false,
            },
            Self::AdjustmentDebit => EntryTypePolicy {
                direction: Some(EntryDirection::Debit),
                requires_related_entry: false,
                requires_approval: true,
            },
            Self::AdjustmentCredit => EntryTypePolicy {
                direction: Some(EntryDirection::Credit),
                requires_related_entry: false,
                requires_approval: true,
            },
            Self::Waiver => EntryTypePolicy {
                direction: Some(EntryDirection::Credit),
                requires_related_entry: true,
                requires_approval: true,
            },
            Self::Reversal => EntryTypePolicy {
                direction: None,
                requires_related_entry: true,
                requires_approval: true,
            },
            Self::TransferIn => EntryTypePolicy {
                direction: Some(EntryDirection::Debit),
                requires_related_entry: false,
                requires_approval: false,
            },
            Self::TransferOut => EntryTypePolicy {
                direction: Some(EntryDirection::Credit),
                requires_related_entry: false,
                requires_approval: false,
            },
        }
    }
}
