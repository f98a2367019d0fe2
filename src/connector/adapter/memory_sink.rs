use std::sync::Mutex;

use crate::application::FactSink;
use crate::domain::{DomainError, Fact, FileId};

/// Keeps every fact in memory, in recording order.
#[derive(Debug, Default)]
pub struct MemorySink {
    facts: Mutex<Vec<Fact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn facts(&self) -> Vec<Fact> {
        self.facts.lock().map(|facts| facts.clone()).unwrap_or_default()
    }

    pub fn facts_for(&self, file_id: FileId) -> Vec<Fact> {
        self.facts()
            .into_iter()
            .filter(|fact| fact.file_id() == file_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.facts.lock().map(|facts| facts.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn take(&self) -> Vec<Fact> {
        self.facts
            .lock()
            .map(|mut facts| std::mem::take(&mut *facts))
            .unwrap_or_default()
    }
}

impl FactSink for MemorySink {
    fn record(&self, fact: Fact) -> Result<(), DomainError> {
        self.facts
            .lock()
            .map_err(|_| DomainError::sink("memory sink lock poisoned"))?
            .push(fact);
        Ok(())
    }
}
