//! Deterministic, pure logic shared by the game core.
//!
//! Core modules must be free of I/O side effects and synchronization. They
//! operate on in-memory data and return deterministic outputs suitable for tests.

pub mod invariants;
pub mod rules;
pub mod table;
pub mod types;
pub mod winners;
