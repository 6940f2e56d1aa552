//! Domain model for habit tracking.
//!
//! # Responsibility
//! - Define tasks, the completion log and the owned application state.
//! - Keep every state transition in one reducer (`AppState::apply`).
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Task removal is a hard delete that cascades into the completion log.

pub mod completion;
pub mod state;
pub mod task;
