//! Student fee ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Immutable, hash-chained ledger entries
//! - Entry type policy (arithmetic direction and structural requirements)
//! - Entry factory for correctly-signed entry drafts
//! - Pre-submission validation
//! - Hash-chain integrity verification
//! - Balance, category, aging, and period-summary derivations
//! - Read-side service that refuses results over a broken chain

pub mod aging;
pub mod balance;
pub mod category;
pub mod entry;
pub mod error;
pub mod factory;
pub mod integrity;
pub mod policy;
pub mod service;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod service_props;
#[cfg(test)]
pub(crate) mod testing;

pub use aging::AgingBuckets;
pub use balance::LedgerBalance;
pub use category::CategoryBalance;
pub use entry::{EntryType, LedgerEntry, NewLedgerEntry, Term};
pub use error::LedgerError;
pub use factory::{EntryFactory, EntryMeta};
pub use integrity::{ChainVerification, GENESIS_HASH};
pub use policy::{EntryDirection, EntryTypePolicy};
pub use service::LedgerService;
pub use summary::LedgerSummary;
pub use validation::{FieldError, ValidationReport, ValidationWarning, MAX_DESCRIPTION_LEN};
