//! Tests for the table and directory services
//!
//! These tests exercise the real implementations against temporary
//! directories and in-memory state.

pub mod shared_file_table;
