use std::path::{Path, PathBuf};

/// Classpath handed over by the host. The indexing core never looks inside;
/// frontends that resolve against libraries use the split entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    raw: String,
    entries: Vec<PathBuf>,
}

impl Classpath {
    /// Splits on `;` and on the platform path-list separator.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(';')
            .flat_map(std::env::split_paths)
            .filter(|entry| !entry.as_os_str().is_empty())
            .collect();
        Self {
            raw: raw.to_string(),
            entries,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn jars(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .map(PathBuf::as_path)
            .filter(|entry| is_jar(entry))
    }

    pub fn source_directories(&self) -> impl Iterator<Item = &Path> {
        self.entries
            .iter()
            .map(PathBuf::as_path)
            .filter(|entry| !is_jar(entry))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_jar(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("jar"))
}
