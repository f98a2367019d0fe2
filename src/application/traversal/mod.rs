//! Per-file walk over a resolved syntax tree, recording symbols and the
//! references between them.

mod context;
pub mod overrides;
mod recorder;
mod visitor;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use context::*;
pub use recorder::*;
pub use visitor::*;

/// Cooperative cancellation shared by every worker of a run.
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
