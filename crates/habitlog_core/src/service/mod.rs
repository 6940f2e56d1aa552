//! Core use-case services.
//!
//! # Responsibility
//! - Wrap the reducer, persistence and statistics into session-level APIs.
//! - Keep UI layers decoupled from storage details.

pub mod task_store;
