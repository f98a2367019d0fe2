use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::traversal::overrides;
use crate::application::{
    JavaFrontend, ParseProblem, ParsedUnit, Resolution, ResolutionOracle, UnresolvedReason,
};
use crate::domain::{Binding, BindingId, Classpath, DomainError, NodeId, SyntaxTree};

pub const SNAPSHOT_EXTENSION: &str = "resolved.json";

/// Resolution outcome of one node as written by the external resolver.
/// Exactly one of `binding` and `unresolved` is expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub node: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<UnresolvedReason>,
}

/// Method override recorded by a resolver that knows the full hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub method: BindingId,
    pub overridden: BindingId,
}

/// A parsed and resolved file as stored on disk.
///
/// Binding handles are indexes into `bindings`. A file the resolver could
/// not parse carries `parse_error` and no tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotUnit {
    #[serde(default)]
    pub tree: Option<SyntaxTree>,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default)]
    pub resolutions: Vec<ResolvedNode>,
    #[serde(default)]
    pub problems: Vec<ParseProblem>,
    /// Methods missing here fall back to comparing erased signatures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl SnapshotUnit {
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_parsed_unit(self) -> Result<ParsedUnit, DomainError> {
        if let Some(message) = self.parse_error {
            return Err(DomainError::parse(message));
        }
        let tree = self
            .tree
            .ok_or_else(|| DomainError::parse("snapshot has no syntax tree"))?;
        let oracle =
            SnapshotOracle::new(self.bindings, &self.resolutions)?.with_overrides(&self.overrides)?;
        Ok(ParsedUnit::new(tree, Box::new(oracle)).with_problems(self.problems))
    }
}

/// Resolver answers replayed from a snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOracle {
    bindings: Vec<Binding>,
    resolutions: HashMap<NodeId, Resolution>,
    overrides: HashMap<BindingId, BindingId>,
}

impl SnapshotOracle {
    /// Declaration nodes named by a binding's `declaring_node` resolve to
    /// that binding unless listed explicitly.
    pub fn new(bindings: Vec<Binding>, resolved: &[ResolvedNode]) -> Result<Self, DomainError> {
        let mut resolutions = HashMap::with_capacity(resolved.len());
        for entry in resolved {
            let resolution = match (entry.binding, &entry.unresolved) {
                (Some(binding), None) => {
                    if binding.0 as usize >= bindings.len() {
                        return Err(DomainError::invalid_input(format!(
                            "node {} resolves to unknown binding {}",
                            entry.node, binding
                        )));
                    }
                    Resolution::Resolved(binding)
                }
                (None, Some(reason)) => Resolution::Unresolved(reason.clone()),
                _ => {
                    return Err(DomainError::invalid_input(format!(
                        "node {} needs exactly one of binding and unresolved",
                        entry.node
                    )))
                }
            };
            resolutions.insert(entry.node, resolution);
        }

        for (index, binding) in bindings.iter().enumerate() {
            if let Some(node) = binding.declaring_node() {
                resolutions
                    .entry(node)
                    .or_insert(Resolution::Resolved(BindingId(index as u32)));
            }
        }

        Ok(Self {
            bindings,
            resolutions,
            overrides: HashMap::new(),
        })
    }

    pub fn with_overrides(mut self, entries: &[OverrideEntry]) -> Result<Self, DomainError> {
        for entry in entries {
            for id in [entry.method, entry.overridden] {
                if !matches!(self.bindings.get(id.0 as usize), Some(Binding::Method { .. })) {
                    return Err(DomainError::invalid_input(format!(
                        "override entry names {} which is not a method",
                        id
                    )));
                }
            }
            self.overrides.insert(entry.method, entry.overridden);
        }
        Ok(self)
    }
}

impl ResolutionOracle for SnapshotOracle {
    fn resolve(&self, node: NodeId) -> Resolution {
        self.resolutions
            .get(&node)
            .cloned()
            .unwrap_or(Resolution::Unresolved(UnresolvedReason::UnsolvedSymbol))
    }

    fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0 as usize)
    }

    fn override_target_of(&self, method: BindingId) -> Option<BindingId> {
        match self.overrides.get(&method) {
            Some(overridden) => Some(*overridden),
            None => overrides::find_overridden_method(self, method),
        }
    }
}

/// Frontend reading the snapshot stored next to each source file as
/// `<file>.resolved.json`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFrontend;

impl SnapshotFrontend {
    pub fn new() -> Self {
        Self
    }

    pub fn snapshot_path(source: &Path) -> PathBuf {
        let mut path = source.as_os_str().to_owned();
        path.push(".");
        path.push(SNAPSHOT_EXTENSION);
        PathBuf::from(path)
    }
}

impl JavaFrontend for SnapshotFrontend {
    fn parse(
        &self,
        path: &Path,
        _source: &str,
        classpath: &Classpath,
    ) -> Result<ParsedUnit, DomainError> {
        let snapshot = Self::snapshot_path(path);
        debug!(
            "Loading {} ({} classpath entries)",
            snapshot.display(),
            classpath.entries().len()
        );
        let json = fs::read_to_string(&snapshot).map_err(|e| {
            DomainError::parse(format!("no resolved snapshot at {}: {}", snapshot.display(), e))
        })?;
        SnapshotUnit::from_json(&json)
            .map_err(|e| DomainError::parse(format!("{}: {}", snapshot.display(), e)))?
            .into_parsed_unit()
    }
}
