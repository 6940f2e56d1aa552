//! Statistics derived from store state.
//!
//! Nothing here is cached; every call recomputes from the current snapshot.

pub mod dashboard;
pub mod engine;
