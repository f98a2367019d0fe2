use tracing::debug;

use super::{IgnoredContexts, Namer, NamingFailure};
use crate::application::Resolution;
use crate::domain::{Binding, BindingId, DeclName, NodeId, NodeKind, TypeName};

impl Namer<'_> {
    /// Names the type written at `node`. Never fails on unresolved types;
    /// those come back as the unsolved sentinel.
    pub fn name_type_node(
        &self,
        node: NodeId,
        ignored: &IgnoredContexts,
    ) -> Result<TypeName, NamingFailure> {
        let _guard = self.descend()?;
        let kind = self.tree.kind(node)?;

        match kind {
            NodeKind::PrimitiveType { keyword } => return Ok(TypeName::new(keyword.clone())),
            NodeKind::ArrayType { element, .. } => return self.name_type_node(*element, ignored),
            _ => {}
        }

        if let Resolution::Resolved(binding) = self.oracle.resolve(node) {
            return Ok(self
                .name_type_binding(binding, ignored)?
                .unwrap_or_else(TypeName::unsolved));
        }

        match kind {
            NodeKind::ParameterizedType { ty, arguments } => {
                let base = self.name_type_node(*ty, ignored)?;
                if base.is_unsolved() {
                    return Ok(base);
                }
                let arguments = arguments
                    .iter()
                    .map(|argument| self.name_type_node(*argument, ignored))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(base.with_type_arguments(arguments))
            }
            NodeKind::WildcardType { .. }
            | NodeKind::UnionType { .. }
            | NodeKind::IntersectionType { .. } => {
                Ok(TypeName::from_text(&self.source.slice(self.tree.range(node)?)))
            }
            other => {
                debug!(
                    "Unresolved type {} at {} in {}",
                    other.label(),
                    self.tree.range(node)?,
                    self.path.display()
                );
                Ok(TypeName::unsolved())
            }
        }
    }

    /// Names a type binding. `None` when the binding is unknown or any
    /// segment of its parent chain cannot be named.
    pub fn name_type_binding(
        &self,
        id: BindingId,
        ignored: &IgnoredContexts,
    ) -> Result<Option<TypeName>, NamingFailure> {
        let _guard = self.descend()?;
        let Some(binding) = self.oracle.binding(id) else {
            debug!("Unknown type binding {}", id);
            return Ok(None);
        };

        match binding {
            Binding::Primitive { name } => Ok(Some(TypeName::new(name.clone()))),
            Binding::Wildcard { text } => Ok(Some(TypeName::from_text(text))),
            Binding::Array { element } => self.name_type_binding(*element, ignored),
            Binding::Parameterized {
                declaration,
                arguments,
            } => {
                let Some(base) = self.name_type_binding(*declaration, ignored)? else {
                    return Ok(None);
                };
                let mut named = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    if let Some(argument) = self.name_type_binding(*argument, ignored)? {
                        named.push(argument);
                    }
                }
                Ok(Some(base.with_type_arguments(named)))
            }
            Binding::Type {
                name,
                type_parameters,
                ..
            } => Ok(self.binding_parent_name(binding, ignored)?.map(|parent| {
                TypeName::new(name.clone())
                    .with_type_parameters(type_parameters.clone())
                    .with_parent(parent)
            })),
            Binding::Anonymous { declared_at, .. } => {
                Ok(self.binding_parent_name(binding, ignored)?.map(|parent| {
                    TypeName::from_decl_name(
                        DeclName::anonymous_class(self.path, *declared_at).with_parent(parent),
                    )
                }))
            }
            Binding::TypeVariable { name, .. } => Ok(self
                .binding_parent_name(binding, ignored)?
                .map(|parent| TypeName::new(name.clone()).with_parent(parent))),
            other => {
                debug!("Binding {} is a {}, not a type", id, other.label());
                Ok(None)
            }
        }
    }
}
