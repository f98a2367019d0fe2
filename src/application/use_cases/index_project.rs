use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{FileOutcome, FileSummary, IndexFileUseCase, IndexOptions};
use crate::application::{FactCounts, FactSink, Interrupt, JavaFrontend};
use crate::domain::{DomainError, FileId};

/// Totals of one indexing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectSummary {
    pub files: usize,
    pub indexed: usize,
    pub parse_failures: usize,
    pub aborted: usize,
    pub unreadable: usize,
    pub interrupted: bool,
    pub counts: FactCounts,
    pub elapsed_ms: u128,
}

impl ProjectSummary {
    fn add(&mut self, file: &FileSummary) {
        match file.outcome {
            FileOutcome::Indexed => self.indexed += 1,
            FileOutcome::ParseFailed => self.parse_failures += 1,
            FileOutcome::Aborted => self.aborted += 1,
            FileOutcome::Interrupted => self.interrupted = true,
        }
        self.counts.add(&file.counts);
    }
}

/// Indexes every `.java` file below a directory, several files at a time.
pub struct IndexProjectUseCase {
    frontend: Arc<dyn JavaFrontend>,
    sink: Arc<dyn FactSink>,
    interrupt: Interrupt,
    show_progress: bool,
}

impl IndexProjectUseCase {
    pub fn new(frontend: Arc<dyn JavaFrontend>, sink: Arc<dyn FactSink>) -> Self {
        Self {
            frontend,
            sink,
            interrupt: Interrupt::new(),
            show_progress: true,
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    pub async fn execute(&self, path: &Path, options: &IndexOptions) -> Result<ProjectSummary, DomainError> {
        let root = path
            .canonicalize()
            .map_err(|e| DomainError::InvalidInput(format!("Invalid path: {}", e)))?;
        let start_time = Instant::now();

        let files = collect_java_files(&root);
        let total_files = files.len();
        info!("Found {} Java files under {}", total_files, root.display());

        let progress_bar = if self.show_progress {
            let bar = ProgressBar::new(total_files as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .map_err(|e| DomainError::internal(format!("Invalid progress bar template: {}", e)))?
                    .progress_chars("#>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let file_use_case = IndexFileUseCase::new(self.frontend.clone(), self.sink.clone())
            .with_interrupt(self.interrupt.clone());

        let mut summary = ProjectSummary {
            files: total_files,
            ..ProjectSummary::default()
        };

        let mut results = stream::iter(files.into_iter().enumerate())
            .map(|(index, file)| {
                let use_case = file_use_case.clone();
                let options = options.clone();
                let interrupt = self.interrupt.clone();
                async move {
                    if interrupt.is_interrupted() {
                        return FileResult::Skipped(file);
                    }
                    index_one(use_case, FileId(index as u32 + 1), file, options).await
                }
            })
            .buffer_unordered(options.jobs.max(1));

        while let Some(result) = results.next().await {
            match result {
                FileResult::Done(file) => {
                    progress_bar.set_message(file_name(&file.path));
                    summary.add(&file);
                }
                FileResult::Unreadable(file) => {
                    progress_bar.set_message(file_name(&file));
                    summary.unreadable += 1;
                }
                FileResult::Skipped(file) => {
                    debug!("Skipped {} after interrupt", file.display());
                    summary.interrupted = true;
                }
            }
            progress_bar.inc(1);
        }

        self.sink.flush()?;
        summary.elapsed_ms = start_time.elapsed().as_millis();
        progress_bar.finish_with_message("Done");

        info!(
            "Indexed {}/{} files in {:.2}s: {} symbols, {} references, {} errors",
            summary.indexed,
            summary.files,
            summary.elapsed_ms as f64 / 1000.0,
            summary.counts.symbols,
            summary.counts.references,
            summary.counts.errors
        );
        Ok(summary)
    }
}

enum FileResult {
    Done(FileSummary),
    Unreadable(PathBuf),
    Skipped(PathBuf),
}

async fn index_one(use_case: IndexFileUseCase, file_id: FileId, path: PathBuf, options: IndexOptions) -> FileResult {
    let source = match tokio::fs::read_to_string(&path).await {
        Ok(source) => source,
        Err(e) => {
            warn!("Failed to read file {}: {}", path.display(), e);
            return FileResult::Unreadable(path);
        }
    };

    let source: Arc<str> = source.into();
    let task_path = path.clone();
    let task_source = source.clone();
    let task_use_case = use_case.clone();
    let task = tokio::task::spawn_blocking(move || {
        task_use_case.process_file(file_id, &task_path, &task_source, &options.classpath, options.verbose)
    });
    match task.await {
        Ok(summary) => FileResult::Done(summary),
        Err(e) => {
            warn!("Indexing task for {} failed: {}", path.display(), e);
            let message = format!("indexing task failed: {}", e);
            FileResult::Done(use_case.abort_file(file_id, &path, &source, &message))
        }
    }
}

/// `.java` files below `root` in path order, honoring ignore files. A
/// single file is returned as is.
pub fn collect_java_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return if is_java_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file() && is_java_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

fn is_java_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("java")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}
