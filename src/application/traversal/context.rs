//! Frames attributing references to their enclosing declarations, and the
//! role tags describing the syntactic position of a type mention.

use crate::domain::ReferenceKind;

/// Names of the declarations open at one point of the walk.
///
/// Frames are linked through the call stack: a child frame borrows its
/// parent and is dropped when the declaration subtree is left. A frame may
/// hold several names; references recorded under it are attributed to
/// each of them.
#[derive(Debug)]
pub struct ContextStack<'p> {
    names: Vec<String>,
    below: Option<&'p ContextStack<'p>>,
}

impl<'p> ContextStack<'p> {
    /// Bottom frame of a file, holding the serialized file name.
    pub fn root(file_name: String) -> Self {
        Self {
            names: vec![file_name],
            below: None,
        }
    }

    pub fn push(&self, names: Vec<String>) -> ContextStack<'_> {
        ContextStack {
            names,
            below: Some(self),
        }
    }

    pub fn push_one(&self, name: String) -> ContextStack<'_> {
        self.push(vec![name])
    }

    /// Context names references are attributed to.
    pub fn current(&self) -> &[String] {
        &self.names
    }

    pub fn depth(&self) -> usize {
        1 + self.below.map_or(0, ContextStack::depth)
    }
}

/// Syntactic position of a type mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceRole {
    TypeUsage,
    Inheritance,
    Override,
    TypeArgument,
}

impl ReferenceRole {
    pub fn reference_kind(&self) -> ReferenceKind {
        match self {
            ReferenceRole::TypeUsage => ReferenceKind::TypeUsage,
            ReferenceRole::Inheritance => ReferenceKind::Inheritance,
            ReferenceRole::Override => ReferenceKind::Override,
            ReferenceRole::TypeArgument => ReferenceKind::TypeArgument,
        }
    }
}

#[derive(Debug, Default)]
pub struct RoleStack {
    roles: Vec<ReferenceRole>,
}

impl RoleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: ReferenceRole) {
        self.roles.push(role);
    }

    pub fn pop(&mut self) -> Option<ReferenceRole> {
        self.roles.pop()
    }

    /// Innermost role; type usage when nothing is pushed.
    pub fn current(&self) -> ReferenceRole {
        self.roles
            .last()
            .copied()
            .unwrap_or(ReferenceRole::TypeUsage)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
