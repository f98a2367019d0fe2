use tracing::debug;

use super::{IgnoredContexts, Namer, NamingFailure};
use crate::domain::{
    Binding, BindingId, DeclName, DomainError, NodeId, NodeKind, TypeName, VariableFlavor,
};

/// Result of naming an enclosing declaration: `None` when it cannot be
/// named, `Some(None)` when there is nothing to qualify with.
type ParentName = Option<Option<DeclName>>;

impl Namer<'_> {
    /// Names the declaration at `node`.
    ///
    /// Accepts the declaration nodes that carry a qualified name. A field
    /// statement with a single variable is named after that variable.
    pub fn name_declaration(
        &self,
        node: NodeId,
        ignored: &IgnoredContexts,
    ) -> Result<DeclName, NamingFailure> {
        let _guard = self.descend()?;
        let kind = self.tree.kind(node)?;

        let name = match kind {
            NodeKind::TypeDeclaration {
                name,
                type_parameters,
                ..
            } => DeclName::new(self.tree.identifier(*name)?)
                .with_type_parameters(self.type_parameter_names(type_parameters)?),
            NodeKind::AnonymousClassBody { .. } => {
                DeclName::anonymous_class(self.path, self.tree.range(node)?.begin())
            }
            NodeKind::MethodDeclaration {
                name,
                modifiers,
                is_constructor,
                type_parameters,
                return_type,
                parameters,
                ..
            } => {
                let own = self.own_ignored(node, ignored);
                let return_type = match return_type {
                    Some(ty) if !is_constructor => Some(self.name_type_node(*ty, &own)?),
                    _ => None,
                };
                let parameters = parameters
                    .iter()
                    .map(|parameter| self.name_parameter_type(*parameter, &own))
                    .collect::<Result<Vec<_>, _>>()?;
                DeclName::new(self.tree.identifier(*name)?)
                    .with_type_parameters(self.type_parameter_names(type_parameters)?)
                    .with_function_signature(return_type, parameters)
                    .with_static(self.is_static(node, modifiers.is_static))
            }
            NodeKind::AnnotationMember {
                name,
                modifiers,
                ty,
                ..
            } => {
                let own = self.own_ignored(node, ignored);
                DeclName::new(self.tree.identifier(*name)?)
                    .with_variable_type(self.name_type_node(*ty, &own)?)
                    .with_static(self.is_static(node, modifiers.is_static))
            }
            NodeKind::FieldDeclaration { fragments, .. } if fragments.len() == 1 => {
                return self.name_declaration(fragments[0], ignored);
            }
            NodeKind::VariableFragment { name, .. } => {
                let statement = self.tree.parent(node);
                let Some(NodeKind::FieldDeclaration { ty, modifiers, .. }) =
                    statement.map(|id| self.tree.kind(id)).transpose()?
                else {
                    debug!(
                        "Variable {} at {} is not a field",
                        self.tree.identifier(*name)?,
                        self.tree.range(node)?
                    );
                    return Ok(DeclName::unsolved());
                };
                DeclName::new(self.tree.identifier(*name)?)
                    .with_variable_type(self.name_type_node(*ty, ignored)?)
                    .with_static(self.is_static(node, modifiers.is_static))
            }
            NodeKind::EnumConstant { name, .. } => DeclName::new(self.tree.identifier(*name)?),
            NodeKind::TypeParameter { name, .. } => DeclName::new(self.tree.identifier(*name)?),
            NodeKind::PackageDeclaration { name, .. } => {
                return Ok(DeclName::from_dotted(&self.tree.dotted_name(*name)?)
                    .unwrap_or_else(DeclName::unsolved));
            }
            other => {
                debug!(
                    "No declaration name for {} at {} in {}",
                    other.label(),
                    self.tree.range(node)?,
                    self.path.display()
                );
                return Ok(DeclName::unsolved());
            }
        };

        Ok(match self.context_name_of_node(node, ignored)? {
            Some(parent) => name.with_parent(parent),
            None => DeclName::unsolved(),
        })
    }

    /// Name of the closest enclosing declaration of `node`, skipping field
    /// statements, variable fragments, initializers and lambdas.
    pub fn context_name_of_node(
        &self,
        node: NodeId,
        ignored: &IgnoredContexts,
    ) -> Result<ParentName, NamingFailure> {
        for ancestor in self.tree.ancestors(node) {
            match self.tree.kind(ancestor)? {
                NodeKind::TypeDeclaration { .. }
                | NodeKind::MethodDeclaration { .. }
                | NodeKind::AnnotationMember { .. }
                | NodeKind::EnumConstant { .. }
                | NodeKind::AnonymousClassBody { .. } => {
                    if ignored.contains_node(ancestor, self.oracle) {
                        return Ok(Some(None));
                    }
                    let name = self.name_declaration(ancestor, ignored)?;
                    return Ok((!name.is_unsolved()).then_some(Some(name)));
                }
                NodeKind::CompilationUnit { package, .. } => {
                    return match package {
                        Some(package) => {
                            let name = self.name_declaration(*package, ignored)?;
                            Ok((!name.is_unsolved()).then_some(Some(name)))
                        }
                        None => Ok(Some(None)),
                    };
                }
                _ => {}
            }
        }
        Ok(Some(None))
    }

    /// Names the declaration behind a binding handle. Produces the same name
    /// as [`Namer::name_declaration`] on the declaring node.
    pub fn name_binding(
        &self,
        id: BindingId,
        ignored: &IgnoredContexts,
    ) -> Result<DeclName, NamingFailure> {
        let _guard = self.descend()?;
        let Some(binding) = self.oracle.binding(id) else {
            debug!("Unknown binding {}", id);
            return Ok(DeclName::unsolved());
        };

        let name = match binding {
            Binding::Package { name } => {
                return Ok(DeclName::from_dotted(name).unwrap_or_else(DeclName::unsolved));
            }
            Binding::Method {
                declaration: Some(declaration),
                ..
            } if *declaration != id => return self.name_binding(*declaration, ignored),
            Binding::Method {
                name,
                type_parameters,
                return_type,
                parameters,
                is_static,
                is_constructor,
                is_annotation_member,
                ..
            } => {
                let own = ignored.with_binding(id);
                let declared = DeclName::new(name.clone())
                    .with_type_parameters(type_parameters.clone())
                    .with_static(*is_static);
                if *is_annotation_member {
                    declared.with_variable_type(self.name_optional_type(*return_type, &own)?)
                } else {
                    let return_type = match return_type {
                        Some(ty) if !is_constructor => Some(self.name_or_unsolved(*ty, &own)?),
                        _ => None,
                    };
                    let parameters = parameters
                        .iter()
                        .map(|parameter| self.name_or_unsolved(*parameter, &own))
                        .collect::<Result<Vec<_>, _>>()?;
                    declared.with_function_signature(return_type, parameters)
                }
            }
            Binding::Variable {
                name,
                flavor: VariableFlavor::Field,
                ty,
                is_static,
                ..
            } => DeclName::new(name.clone())
                .with_variable_type(self.name_optional_type(*ty, ignored)?)
                .with_static(*is_static),
            Binding::Variable {
                name,
                flavor: VariableFlavor::EnumConstant,
                ..
            } => DeclName::new(name.clone()),
            Binding::Variable { name, flavor, .. } => {
                debug!("{} is a {:?} variable, named by position", name, flavor);
                return Ok(DeclName::unsolved());
            }
            _ => {
                return Ok(self
                    .name_type_binding(id, ignored)?
                    .map(|ty| ty.to_decl_name())
                    .unwrap_or_else(DeclName::unsolved));
            }
        };

        Ok(match self.binding_parent_name(binding, ignored)? {
            Some(parent) => name.with_parent(parent),
            None => DeclName::unsolved(),
        })
    }

    /// Names the declaration a binding is qualified with.
    pub(super) fn binding_parent_name(
        &self,
        binding: &Binding,
        ignored: &IgnoredContexts,
    ) -> Result<ParentName, NamingFailure> {
        let Some(parent) = binding.parent() else {
            return Ok(Some(None));
        };
        if ignored.contains_binding(parent, self.oracle) {
            return Ok(Some(None));
        }

        match self.oracle.binding(parent) {
            None => {
                debug!("Unknown parent binding {} of {}", parent, binding.label());
                Ok(None)
            }
            Some(Binding::Package { name }) => Ok(Some(DeclName::from_dotted(name))),
            Some(parent_binding) if parent_binding.is_type() => Ok(self
                .name_type_binding(parent, ignored)?
                .map(|ty| Some(ty.to_decl_name()))),
            Some(_) => {
                let name = self.name_binding(parent, ignored)?;
                Ok((!name.is_unsolved()).then_some(Some(name)))
            }
        }
    }

    fn own_ignored(&self, node: NodeId, ignored: &IgnoredContexts) -> IgnoredContexts {
        let own = ignored.with_node(node);
        match self.oracle.resolve(node).binding() {
            Some(binding) => own.with_binding(binding),
            None => own,
        }
    }

    /// Static flag of a declaration, preferring what the resolver knows.
    fn is_static(&self, node: NodeId, declared: bool) -> bool {
        match self
            .oracle
            .resolve(node)
            .binding()
            .and_then(|id| self.oracle.binding(id))
        {
            Some(Binding::Method { is_static, .. }) | Some(Binding::Variable { is_static, .. }) => {
                *is_static
            }
            _ => declared,
        }
    }

    fn type_parameter_names(&self, type_parameters: &[NodeId]) -> Result<Vec<String>, NamingFailure> {
        type_parameters
            .iter()
            .map(|parameter| match self.tree.kind(*parameter)? {
                NodeKind::TypeParameter { name, .. } => Ok(self.tree.identifier(*name)?.to_string()),
                other => Err(DomainError::invariant(format!(
                    "expected TypeParameter at {}, found {}",
                    parameter,
                    other.label()
                ))
                .into()),
            })
            .collect()
    }

    /// Parameter types come from the written type, or from the resolver for
    /// parameters declared without one.
    fn name_parameter_type(
        &self,
        parameter: NodeId,
        ignored: &IgnoredContexts,
    ) -> Result<TypeName, NamingFailure> {
        match self.tree.kind(parameter)? {
            NodeKind::Parameter { ty: Some(ty), .. } => self.name_type_node(*ty, ignored),
            NodeKind::Parameter { ty: None, .. } => {
                let ty = match self
                    .oracle
                    .resolve(parameter)
                    .binding()
                    .and_then(|id| self.oracle.binding(id))
                {
                    Some(Binding::Variable { ty, .. }) => *ty,
                    _ => None,
                };
                self.name_optional_type(ty, ignored)
            }
            other => Err(DomainError::invariant(format!(
                "expected Parameter at {}, found {}",
                parameter,
                other.label()
            ))
            .into()),
        }
    }

    fn name_or_unsolved(
        &self,
        ty: BindingId,
        ignored: &IgnoredContexts,
    ) -> Result<TypeName, NamingFailure> {
        Ok(self
            .name_type_binding(ty, ignored)?
            .unwrap_or_else(TypeName::unsolved))
    }

    fn name_optional_type(
        &self,
        ty: Option<BindingId>,
        ignored: &IgnoredContexts,
    ) -> Result<TypeName, NamingFailure> {
        match ty {
            Some(ty) => self.name_or_unsolved(ty, ignored),
            None => Ok(TypeName::unsolved()),
        }
    }
}
