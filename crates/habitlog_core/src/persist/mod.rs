//! Snapshot persistence pipeline.

pub mod writer;
