//! Flight key derivation and cross-process reconciliation
//!
//! This library derives stable identifiers for flight occurrences and keeps a
//! persistent lookup table that lets two independently running processes
//! converge on one identifier per real-world flight, even when one side only
//! knows a partial or slightly wrong signature.

pub mod core;
pub mod error;
pub mod services;
pub mod store;
pub mod traits;

// Re-export commonly used types
pub use crate::core::{derive_identifier, ExistingMapping, KeyFactory, MatchKind};
pub use error::{ReconcilerError, ReconcilerResult};
pub use services::{AirportDirectory, AirportEntry, MemoryTable, SharedFileTable};
pub use store::{Outcome, Reconciled, ReconciliationStore};
pub use traits::{AirportResolver, KeyValueTable, TableKey, TimeZoneResolver};
pub use traits::{MockAirportResolver, MockKeyValueTable, MockTimeZoneResolver};
