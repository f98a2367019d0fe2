use crate::domain::{DomainError, Fact};

/// Receives facts as they are recorded. Shared by every file indexed in a
/// run, so implementations synchronize internally.
pub trait FactSink: Send + Sync {
    fn record(&self, fact: Fact) -> Result<(), DomainError>;

    fn flush(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
