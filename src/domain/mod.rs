//! # Domain Layer
//!
//! Name model, resolved syntax tree, resolver bindings and recorded facts.
//! This layer is independent of the frontend producing trees and of the
//! sinks consuming facts.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
