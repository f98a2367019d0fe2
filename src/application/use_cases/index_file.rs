use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::application::{
    AstTraversal, FactCounts, FactSink, Interrupt, JavaFrontend, Recorder,
};
use crate::domain::{Classpath, FileId, Position, Range, SourceText};

/// Settings shared by every file of a run.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub classpath: Classpath,
    /// Maximum number of files indexed at the same time.
    pub jobs: usize,
    /// Dump every visited node at debug level.
    pub verbose: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            classpath: Classpath::default(),
            jobs: std::thread::available_parallelism().map_or(1, |n| n.get()),
            verbose: false,
        }
    }
}

impl IndexOptions {
    pub fn with_classpath(mut self, classpath: Classpath) -> Self {
        self.classpath = classpath;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Indexed,
    /// The frontend produced no tree.
    ParseFailed,
    /// The walk hit a broken tree and stopped.
    Aborted,
    Interrupted,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub file_id: FileId,
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub counts: FactCounts,
}

impl FileSummary {
    pub fn is_indexed(&self) -> bool {
        self.outcome == FileOutcome::Indexed
    }
}

/// Indexes a single source file into the sink.
#[derive(Clone)]
pub struct IndexFileUseCase {
    frontend: Arc<dyn JavaFrontend>,
    sink: Arc<dyn FactSink>,
    interrupt: Interrupt,
}

impl IndexFileUseCase {
    pub fn new(frontend: Arc<dyn JavaFrontend>, sink: Arc<dyn FactSink>) -> Self {
        Self {
            frontend,
            sink,
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Parses, resolves and walks one file. Everything learned about the
    /// file is reported through the sink; the summary only counts it.
    pub fn process_file(
        &self,
        file_id: FileId,
        path: &Path,
        source: &str,
        classpath: &Classpath,
        verbose: bool,
    ) -> FileSummary {
        let mut recorder = Recorder::new(self.sink.as_ref(), file_id);
        let text = SourceText::new(source);
        let file_range = whole_file(&text);

        let unit = match self.frontend.parse(path, source, classpath) {
            Ok(unit) => unit,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                recorder.record_error(e.to_string(), true, false, file_range);
                return summary(file_id, path, FileOutcome::ParseFailed, &recorder);
            }
        };

        for problem in unit.problems() {
            debug!("Parser problem in {} at {}: {}", path.display(), problem.range, problem.message);
            recorder.record_error(problem.message.clone(), false, true, problem.range);
        }

        let mut traversal = AstTraversal::new(unit.tree(), unit.oracle(), &text, path, recorder)
            .with_interrupt(self.interrupt.clone())
            .with_verbose(verbose);
        let result = traversal.run();
        let mut recorder = traversal.into_recorder();

        let outcome = match result {
            Ok(()) if self.interrupt.is_interrupted() => FileOutcome::Interrupted,
            Ok(()) => FileOutcome::Indexed,
            Err(e) => {
                warn!("Stopped indexing {}: {}", path.display(), e);
                recorder.record_error(e.to_string(), true, true, file_range);
                FileOutcome::Aborted
            }
        };

        debug!(
            "Indexed {} ({} facts, {} errors)",
            path.display(),
            recorder.counts().total(),
            recorder.counts().errors
        );
        summary(file_id, path, outcome, &recorder)
    }

    /// Records a file whose walk died without reporting back, such as a
    /// panicking worker.
    pub fn abort_file(&self, file_id: FileId, path: &Path, source: &str, message: &str) -> FileSummary {
        let mut recorder = Recorder::new(self.sink.as_ref(), file_id);
        let file_range = whole_file(&SourceText::new(source));
        recorder.record_error(message.to_string(), true, true, file_range);
        summary(file_id, path, FileOutcome::Aborted, &recorder)
    }
}

fn whole_file(text: &SourceText) -> Range {
    Range::between(Position::new(1, 1), text.end())
}

fn summary(file_id: FileId, path: &Path, outcome: FileOutcome, recorder: &Recorder<'_>) -> FileSummary {
    FileSummary {
        file_id,
        path: path.to_path_buf(),
        outcome,
        counts: recorder.counts(),
    }
}
