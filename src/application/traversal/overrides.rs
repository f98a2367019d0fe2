//! Default override search used by [`ResolutionOracle`] implementations
//! that cannot answer override queries themselves.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::application::naming::MAX_NAMING_DEPTH;
use crate::application::ResolutionOracle;
use crate::domain::{Binding, BindingId};

const OBJECT: &str = "java.lang.Object";

/// Erased parameter type used to compare signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Erasure {
    Primitive(String),
    /// Fully qualified name of a package member type.
    Named(String),
    /// Local and anonymous classes have no qualified name.
    Local(BindingId),
    Array(Box<Erasure>),
    Unknown,
}

impl Erasure {
    fn matches(&self, other: &Erasure) -> bool {
        match (self, other) {
            (Erasure::Unknown, _) | (_, Erasure::Unknown) => false,
            (Erasure::Array(a), Erasure::Array(b)) => a.matches(b),
            (a, b) => a == b,
        }
    }
}

/// Erasures of the type arguments an ancestor was inherited with, keyed by
/// the generic declaration and the type parameter name.
type Substitution = HashMap<(BindingId, String), Erasure>;

fn qualified_name<O: ResolutionOracle + ?Sized>(oracle: &O, ty: BindingId) -> Option<String> {
    let mut segments = Vec::new();
    let mut current = Some(ty);
    while let Some(id) = current {
        if segments.len() > MAX_NAMING_DEPTH {
            return None;
        }
        match oracle.binding(id)? {
            Binding::Type { name, parent, .. } => {
                segments.push(name.as_str());
                current = *parent;
            }
            Binding::Package { name } => {
                segments.push(name.as_str());
                current = None;
            }
            _ => return None,
        }
    }
    segments.reverse();
    Some(segments.join("."))
}

/// Type variables bound by `substitution` take the inherited argument. Any
/// other type variable erases to its bound, or to `java.lang.Object`.
fn erasure<O: ResolutionOracle + ?Sized>(
    oracle: &O,
    ty: BindingId,
    substitution: &Substitution,
    depth: usize,
) -> Erasure {
    if depth > MAX_NAMING_DEPTH {
        return Erasure::Unknown;
    }
    match oracle.binding(ty) {
        Some(Binding::Primitive { name }) => Erasure::Primitive(name.clone()),
        Some(Binding::Type { .. }) | Some(Binding::Anonymous { .. }) => {
            qualified_name(oracle, ty).map_or(Erasure::Local(ty), Erasure::Named)
        }
        Some(Binding::Parameterized { declaration, .. }) => {
            erasure(oracle, *declaration, substitution, depth + 1)
        }
        Some(Binding::Array { element }) => {
            Erasure::Array(Box::new(erasure(oracle, *element, substitution, depth + 1)))
        }
        Some(Binding::TypeVariable {
            name,
            parent,
            bound,
            ..
        }) => {
            if let Some(found) = parent.and_then(|owner| substitution.get(&(owner, name.clone()))) {
                return found.clone();
            }
            match bound {
                Some(bound) => erasure(oracle, *bound, substitution, depth + 1),
                None => Erasure::Named(OBJECT.to_string()),
            }
        }
        _ => Erasure::Unknown,
    }
}

/// Records the arguments of a parameterized ancestor and returns its generic
/// declaration. Raw ancestors bind nothing, so their type variables erase.
fn bind_arguments<O: ResolutionOracle + ?Sized>(
    oracle: &O,
    ancestor: BindingId,
    substitution: &mut Substitution,
) -> BindingId {
    let Some(Binding::Parameterized {
        declaration,
        arguments,
    }) = oracle.binding(ancestor)
    else {
        return ancestor;
    };
    let Some(Binding::Type {
        type_parameters, ..
    }) = oracle.binding(*declaration)
    else {
        return *declaration;
    };
    let bound: Vec<_> = type_parameters
        .iter()
        .zip(arguments)
        .map(|(name, argument)| {
            (
                (*declaration, name.clone()),
                erasure(oracle, *argument, substitution, 0),
            )
        })
        .collect();
    substitution.extend(bound);
    *declaration
}

/// Generic instantiations answer for their declaration.
fn declaration_of<O: ResolutionOracle + ?Sized>(oracle: &O, method: BindingId) -> BindingId {
    match oracle.binding(method) {
        Some(Binding::Method {
            declaration: Some(declaration),
            ..
        }) => *declaration,
        _ => method,
    }
}

/// Whether `method` has the name and erased parameter types of `candidate`
/// as seen from the subtype. Constructors and static methods never override.
fn signatures_match<O: ResolutionOracle + ?Sized>(
    oracle: &O,
    method: BindingId,
    candidate: BindingId,
    substitution: &Substitution,
) -> bool {
    let method = declaration_of(oracle, method);
    let candidate = declaration_of(oracle, candidate);
    if method == candidate {
        return false;
    }
    let (
        Some(Binding::Method {
            name,
            parameters,
            is_static: false,
            is_constructor: false,
            ..
        }),
        Some(Binding::Method {
            name: candidate_name,
            parameters: candidate_parameters,
            is_static: false,
            is_constructor: false,
            ..
        }),
    ) = (oracle.binding(method), oracle.binding(candidate))
    else {
        return false;
    };

    let unbound = Substitution::new();
    name == candidate_name
        && parameters.len() == candidate_parameters.len()
        && parameters.iter().zip(candidate_parameters).all(|(own, inherited)| {
            erasure(oracle, *own, &unbound, 0).matches(&erasure(oracle, *inherited, substitution, 0))
        })
}

/// Searches every ancestor of the declaring type, nearest first, for the
/// method `method` overrides. Each type is visited once, so cyclic
/// hierarchies terminate.
pub fn find_overridden_method<O: ResolutionOracle + ?Sized>(
    oracle: &O,
    method: BindingId,
) -> Option<BindingId> {
    let declaring_type = match oracle.binding(method)? {
        Binding::Method {
            parent: Some(parent),
            is_constructor: false,
            is_static: false,
            ..
        } => *parent,
        _ => return None,
    };

    let mut substitution = Substitution::new();
    let mut visited = HashSet::from([declaring_type]);
    let mut queue: VecDeque<BindingId> = oracle.ancestors_of(declaring_type).into();
    while let Some(ancestor) = queue.pop_front() {
        let ancestor = bind_arguments(oracle, ancestor, &mut substitution);
        if !visited.insert(ancestor) {
            continue;
        }
        if let Some(found) = oracle
            .declared_methods(ancestor)
            .into_iter()
            .find(|candidate| signatures_match(oracle, method, *candidate, &substitution))
        {
            return Some(found);
        }
        queue.extend(oracle.ancestors_of(ancestor));
    }
    None
}
