//! Core business logic modules
//!
//! Pure key derivation and matching logic with no I/O dependencies.
//! All functions are deterministic and easily testable.

pub mod key_factory;
pub mod matcher;

pub use key_factory::{derive_identifier, KeyFactory};
pub use matcher::{find_existing_mapping, ExistingMapping, MatchKind, MAX_PROXIMITY_DAYS};
