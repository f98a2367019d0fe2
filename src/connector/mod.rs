//! # Connector Layer
//!
//! Implementations of the application interfaces:
//! - Frontend replaying resolved snapshots written by an external resolver
//! - Fact sinks (JSON lines, in memory)

pub mod adapter;

pub use adapter::*;
