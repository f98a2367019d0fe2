//! # Application Layer
//!
//! Naming, the per-file traversal and the indexing use cases, written
//! against the frontend and sink interfaces.

pub mod interfaces;
pub mod naming;
pub mod traversal;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use interfaces::*;
pub use naming::*;
pub use traversal::*;
pub use use_cases::*;
