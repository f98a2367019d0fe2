use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::application::FactSink;
use crate::domain::{DomainError, Fact};

/// Writes one JSON object per fact and line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> Result<W, DomainError> {
        self.writer
            .into_inner()
            .map_err(|_| DomainError::sink("fact writer lock poisoned"))
    }
}

impl JsonLinesSink<Box<dyn Write + Send>> {
    /// Writes to `path`, or to stdout when no path is given.
    pub fn open(path: Option<&Path>) -> Result<Self, DomainError> {
        let writer: Box<dyn Write + Send> = match path {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout())),
        };
        Ok(Self::new(writer))
    }
}

impl<W: Write + Send> FactSink for JsonLinesSink<W> {
    fn record(&self, fact: Fact) -> Result<(), DomainError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| DomainError::sink("fact writer lock poisoned"))?;
        serde_json::to_writer(&mut *writer, &fact)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<(), DomainError> {
        self.writer
            .lock()
            .map_err(|_| DomainError::sink("fact writer lock poisoned"))?
            .flush()?;
        Ok(())
    }
}
