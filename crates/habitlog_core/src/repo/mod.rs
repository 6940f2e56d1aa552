//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define collection-level data access contracts.
//! - Isolate SQLite query details from the store and writer.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`InvalidData`) in addition to
//!   DB transport errors.

pub mod habit_repo;
