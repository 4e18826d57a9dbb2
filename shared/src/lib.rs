//! Shared types for the flight key reconciliation system
//!
//! Contains the vocabulary both cooperating processes agree on: flight
//! signatures, identifiers, process roles, logging and configuration.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;

pub use config::StoreConfig;
pub use errors::*;
pub use types::*;
