//! Service implementations
//!
//! Real implementations of the collaborator traits: process-local and shared
//! persistent tables, and the in-memory airport directory.

pub mod airport_directory;
pub mod memory_table;
pub mod shared_file_table;

#[cfg(test)]
pub mod tests;

pub use airport_directory::{AirportDirectory, AirportEntry};
pub use memory_table::MemoryTable;
pub use shared_file_table::SharedFileTable;
