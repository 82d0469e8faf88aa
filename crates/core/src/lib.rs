//! Core fee-ledger logic for Tally.
//!
//! Pure business logic with no web or database dependencies. The single
//! mutating operation (entry append) is delegated to a store boundary;
//! everything here is either entry construction/validation or a pure
//! derivation over an immutable entry snapshot.

pub mod ledger;
