use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use super::{ContextStack, Interrupt, Recorder, ReferenceRole, RoleStack};
use crate::application::{
    IgnoredContexts, Namer, NamingFailure, Resolution, ResolutionOracle, UnresolvedReason,
};
use crate::domain::{
    file_name_hierarchy, positional_name, AccessKind, Binding, BindingId, DeclName,
    DefinitionKind, DomainError, MethodReferenceFlavor, NodeId, NodeKind, Position, Range,
    ReferenceKind, SourceText, SymbolKind, SyntaxTree, TypeFlavor, TypeName, VariableFlavor,
};

/// One walk over a resolved unit.
///
/// Declarations open a context frame for their subtree; references are
/// recorded once per name in the innermost frame. Node-local failures
/// become error facts and the walk moves on. A broken tree stops the walk
/// with [`DomainError::InvariantViolation`].
pub struct AstTraversal<'a, 's> {
    tree: &'a SyntaxTree,
    oracle: &'a dyn ResolutionOracle,
    source: &'a SourceText,
    path: &'a Path,
    namer: Namer<'a>,
    recorder: Recorder<'s>,
    roles: RoleStack,
    comments: HashSet<Range>,
    interrupt: Interrupt,
    verbose: bool,
    depth: usize,
}

impl<'a, 's> AstTraversal<'a, 's> {
    pub fn new(
        tree: &'a SyntaxTree,
        oracle: &'a dyn ResolutionOracle,
        source: &'a SourceText,
        path: &'a Path,
        recorder: Recorder<'s>,
    ) -> Self {
        Self {
            tree,
            oracle,
            source,
            path,
            namer: Namer::new(tree, oracle, source, path),
            recorder,
            roles: RoleStack::new(),
            comments: HashSet::new(),
            interrupt: Interrupt::new(),
            verbose: false,
            depth: 0,
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Logs every visited node before it is processed.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn run(&mut self) -> Result<(), DomainError> {
        let tree = self.tree;
        let file_context = ContextStack::root(file_name_hierarchy(self.path).serialize());
        for comment in tree.comments() {
            self.record_comment(*comment)?;
        }
        self.visit(tree.root(), &file_context)
    }

    pub fn into_recorder(self) -> Recorder<'s> {
        self.recorder
    }

    fn visit(&mut self, node: NodeId, ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        let tree = self.tree;
        let kind = tree.kind(node)?;
        if self.verbose {
            debug!(
                "{:indent$}{} line {}",
                "",
                kind.label(),
                tree.range(node)?.begin_line,
                indent = self.depth * 2
            );
        }
        self.depth += 1;
        let result = self.dispatch(node, kind, ctx);
        self.depth -= 1;
        result
    }

    fn dispatch(
        &mut self,
        node: NodeId,
        kind: &'a NodeKind,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let tree = self.tree;
        match kind {
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            } => {
                self.visit_opt(*package, ctx)?;
                self.visit_all(imports, ctx)?;
                self.visit_members(types, ctx)
            }
            NodeKind::PackageDeclaration { name, annotations } => {
                self.visit_package(*name, annotations, ctx)
            }
            NodeKind::ImportDeclaration { name, .. } => self.visit_import(node, *name, ctx),
            NodeKind::TypeDeclaration { .. } => self.visit_type_declaration(node, ctx),
            NodeKind::AnonymousClassBody { .. } => self.visit_anonymous_class(node, None, ctx),
            NodeKind::TypeParameter { name, bounds } => {
                let declared = self.declaration_name(node)?.serialize();
                self.recorder.record_symbol_with_location(
                    declared.clone(),
                    SymbolKind::TypeParameter,
                    tree.range(*name)?,
                    AccessKind::TypeParameter,
                    DefinitionKind::Explicit,
                );
                let inner = ctx.push_one(declared);
                self.visit_all(bounds, &inner)
            }
            NodeKind::FieldDeclaration { .. } => self.visit_field_declaration(node, ctx),
            NodeKind::VariableFragment { name, initializer } => {
                self.record_local_declaration(*name)?;
                self.visit_opt(*initializer, ctx)
            }
            NodeKind::MethodDeclaration { .. } => self.visit_method(node, ctx),
            NodeKind::AnnotationMember {
                name,
                modifiers,
                javadoc,
                annotations,
                ty,
                default,
            } => {
                let declared = self.declaration_name(node)?.serialize();
                self.recorder.record_symbol_with_location(
                    declared.clone(),
                    SymbolKind::Field,
                    tree.range(*name)?,
                    modifiers.visibility.into(),
                    DefinitionKind::Explicit,
                );
                self.record_javadoc(*javadoc)?;
                let inner = ctx.push_one(declared);
                self.with_role(ReferenceRole::TypeUsage, |this| {
                    this.visit_all(annotations, &inner)?;
                    this.visit(*ty, &inner)?;
                    this.visit_opt(*default, &inner)
                })
            }
            NodeKind::EnumConstant {
                name,
                javadoc,
                annotations,
                arguments,
                body,
            } => {
                let declared = self.declaration_name(node)?.serialize();
                self.recorder.record_symbol_with_location(
                    declared.clone(),
                    SymbolKind::EnumConstant,
                    tree.range(*name)?,
                    AccessKind::None,
                    DefinitionKind::Explicit,
                );
                self.record_javadoc(*javadoc)?;
                let inner = ctx.push_one(declared);
                self.with_role(ReferenceRole::TypeUsage, |this| {
                    this.visit_all(annotations, &inner)?;
                    this.visit_all(arguments, &inner)?;
                    this.visit_opt(*body, &inner)
                })
            }
            NodeKind::Initializer { javadoc, body, .. } => {
                self.record_javadoc(*javadoc)?;
                self.visit(*body, ctx)
            }
            NodeKind::Parameter {
                name,
                annotations,
                ty,
                ..
            } => {
                self.visit_all(annotations, ctx)?;
                self.visit_opt(*ty, ctx)?;
                self.record_local_declaration(*name)
            }
            NodeKind::Block { statements } => {
                self.recorder.record_scope(self.path, tree.range(node)?);
                self.visit_all(statements, ctx)
            }
            NodeKind::SwitchStatement { selector, body } => {
                self.visit(*selector, ctx)?;
                let range = tree.range(node)?;
                let scope = self
                    .source
                    .find("{", tree.range(*selector)?.end())
                    .map_or(range, |brace| Range::between(brace, range.end()));
                self.recorder.record_scope(self.path, scope);
                self.visit_all(body, ctx)
            }
            NodeKind::ArrayInitializer { elements } => {
                self.recorder.record_scope(self.path, tree.range(node)?);
                self.visit_all(elements, ctx)
            }
            NodeKind::SimpleName { .. } => {
                if let Some(binding) = self.resolve_reference(node)? {
                    self.record_binding_use(node, binding, tree.range(node)?, ctx)?;
                }
                Ok(())
            }
            NodeKind::QualifiedName { qualifier, name } => {
                if self.record_member_use(node, *name, ctx)? {
                    self.visit(*qualifier, ctx)?;
                }
                Ok(())
            }
            NodeKind::FieldAccess { expression, name } => {
                self.visit(*expression, ctx)?;
                self.record_member_use(node, *name, ctx)?;
                Ok(())
            }
            NodeKind::SuperFieldAccess { qualifier, name } => {
                self.visit_opt(*qualifier, ctx)?;
                self.record_member_use(node, *name, ctx)?;
                Ok(())
            }
            NodeKind::ThisExpression { qualifier } => self.visit_opt(*qualifier, ctx),
            NodeKind::MethodInvocation {
                expression,
                type_arguments,
                name,
                arguments,
            } => {
                self.record_invocation(node, tree.range(*name)?, ReferenceKind::Call, ctx)?;
                self.visit_opt(*expression, ctx)?;
                self.visit_type_arguments(type_arguments, ctx)?;
                self.visit_all(arguments, ctx)
            }
            NodeKind::SuperMethodInvocation {
                qualifier,
                type_arguments,
                name,
                arguments,
            } => {
                self.record_invocation(node, tree.range(*name)?, ReferenceKind::Call, ctx)?;
                self.visit_opt(*qualifier, ctx)?;
                self.visit_type_arguments(type_arguments, ctx)?;
                self.visit_all(arguments, ctx)
            }
            NodeKind::ConstructorInvocation {
                type_arguments,
                arguments,
            } => {
                let range = self.keyword_range("this", tree.range(node)?);
                self.record_invocation(node, range, ReferenceKind::Call, ctx)?;
                self.visit_type_arguments(type_arguments, ctx)?;
                self.visit_all(arguments, ctx)
            }
            NodeKind::SuperConstructorInvocation {
                expression,
                type_arguments,
                arguments,
            } => {
                let from = match expression {
                    Some(expression) => tree.range(*expression)?.end(),
                    None => tree.range(node)?.begin(),
                };
                let range = self.keyword_range_from("super", from, tree.range(node)?);
                self.record_invocation(node, range, ReferenceKind::Call, ctx)?;
                self.visit_opt(*expression, ctx)?;
                self.visit_type_arguments(type_arguments, ctx)?;
                self.visit_all(arguments, ctx)
            }
            NodeKind::ClassInstanceCreation { .. } => self.visit_instance_creation(node, ctx),
            NodeKind::MethodReference { .. } => self.visit_method_reference(node, ctx),
            NodeKind::SimpleType { name } => {
                self.record_type_reference(node, tree.last_name_range(*name)?, ctx)
            }
            NodeKind::QualifiedType { name, .. } => {
                self.record_type_reference(node, tree.range(*name)?, ctx)
            }
            NodeKind::ParameterizedType { ty, arguments } => {
                self.visit(*ty, ctx)?;
                self.visit_type_arguments(arguments, ctx)
            }
            NodeKind::PrimitiveType { keyword } => {
                let builtin = TypeName::new(keyword.clone()).serialize();
                self.recorder.record_symbol(
                    builtin.clone(),
                    SymbolKind::BuiltinType,
                    AccessKind::None,
                    DefinitionKind::Explicit,
                );
                let kind = self.roles.current().reference_kind();
                self.record_references(kind, &builtin, ctx, tree.range(node)?);
                Ok(())
            }
            NodeKind::Annotation { type_name, values } => {
                if let Some(binding) = self.resolve_reference(node)? {
                    let range = tree.last_name_range(*type_name)?;
                    self.record_type_use(node, binding, range, ReferenceKind::AnnotationUsage, ctx)?;
                }
                self.visit_all(values, ctx)
            }
            NodeKind::MemberValuePair { name, value } => {
                if let Some(binding) = self.resolve_reference(node)? {
                    if let Some(member) = self.name_binding(node, binding)? {
                        let member = member.serialize();
                        self.record_references(ReferenceKind::Usage, &member, ctx, tree.range(*name)?);
                    }
                }
                self.visit(*value, ctx)
            }
            NodeKind::Comment { .. } => self.record_comment(node),
            NodeKind::LocalVariableDeclaration { .. }
            | NodeKind::Lambda { .. }
            | NodeKind::CatchClause { .. }
            | NodeKind::TryStatement { .. }
            | NodeKind::ArrayType { .. }
            | NodeKind::WildcardType { .. }
            | NodeKind::UnionType { .. }
            | NodeKind::IntersectionType { .. }
            | NodeKind::Other { .. } => self.visit_all(&kind.children(), ctx),
        }
    }

    fn visit_all(&mut self, nodes: &[NodeId], ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        for node in nodes {
            self.visit(*node, ctx)?;
        }
        Ok(())
    }

    fn visit_opt(&mut self, node: Option<NodeId>, ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        match node {
            Some(node) => self.visit(node, ctx),
            None => Ok(()),
        }
    }

    /// Visits top-level types or type members, stopping early once the
    /// run is interrupted.
    fn visit_members(&mut self, members: &[NodeId], ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        for member in members {
            if self.interrupt.is_interrupted() {
                debug!("Interrupted, skipping remaining members in {}", self.path.display());
                return Ok(());
            }
            self.visit(*member, ctx)?;
        }
        Ok(())
    }

    fn visit_type_arguments(
        &mut self,
        arguments: &[NodeId],
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        self.with_role(ReferenceRole::TypeArgument, |this| this.visit_all(arguments, ctx))
    }

    fn with_role<T>(&mut self, role: ReferenceRole, f: impl FnOnce(&mut Self) -> T) -> T {
        self.roles.push(role);
        let result = f(self);
        self.roles.pop();
        result
    }

    fn visit_package(
        &mut self,
        name: NodeId,
        annotations: &[NodeId],
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        self.visit_all(annotations, ctx)?;
        let Some(package) = DeclName::from_dotted(&self.tree.dotted_name(name)?) else {
            return Ok(());
        };
        self.recorder.record_symbol_with_location(
            package.serialize(),
            SymbolKind::Package,
            self.tree.last_name_range(name)?,
            AccessKind::None,
            DefinitionKind::Explicit,
        );
        let mut qualifier = package.parent();
        while let Some(prefix) = qualifier {
            self.recorder.record_symbol(
                prefix.serialize(),
                SymbolKind::Package,
                AccessKind::None,
                DefinitionKind::Explicit,
            );
            qualifier = prefix.parent();
        }
        Ok(())
    }

    fn visit_import(
        &mut self,
        node: NodeId,
        name: NodeId,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let Some(binding) = self.resolve_reference(node)? else {
            return Ok(());
        };
        let Some(imported) = self.name_binding(node, binding)? else {
            return Ok(());
        };
        let imported = imported.serialize();
        if let Some(Binding::Package { .. }) = self.oracle.binding(binding) {
            self.recorder.record_symbol(
                imported.clone(),
                SymbolKind::Package,
                AccessKind::None,
                DefinitionKind::None,
            );
        }
        let range = self.tree.last_name_range(name)?;
        self.record_references(ReferenceKind::Import, &imported, ctx, range);
        Ok(())
    }

    fn visit_type_declaration(&mut self, node: NodeId, ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::TypeDeclaration {
            flavor,
            name,
            modifiers,
            javadoc,
            annotations,
            type_parameters,
            superclass,
            interfaces,
            enum_constants,
            members,
        } = tree.kind(node)?
        else {
            return Err(unexpected(node, "TypeDeclaration", tree.kind(node)?));
        };

        let declared = self.declaration_name(node)?.serialize();
        let range = tree.range(node)?;
        self.recorder.record_symbol_with_location_and_scope(
            declared.clone(),
            type_symbol_kind(*flavor),
            tree.range(*name)?,
            range,
            modifiers.visibility.into(),
            DefinitionKind::Explicit,
        );

        let mut header_end = tree.range(*name)?.end();
        for part in type_parameters.iter().chain(superclass).chain(interfaces) {
            header_end = header_end.max(tree.range(*part)?.end());
        }
        let body = self
            .source
            .find("{", header_end)
            .map_or(range, |brace| Range::between(brace, range.end()));
        self.recorder.record_scope(self.path, body);
        self.record_javadoc(*javadoc)?;

        let inner = ctx.push_one(declared);
        self.with_role(ReferenceRole::TypeUsage, |this| {
            this.visit_all(annotations, &inner)?;
            this.visit_all(type_parameters, &inner)?;
            this.with_role(ReferenceRole::Inheritance, |this| {
                this.visit_opt(*superclass, &inner)?;
                this.visit_all(interfaces, &inner)
            })?;
            this.visit_members(enum_constants, &inner)?;
            this.visit_members(members, &inner)
        })
    }

    /// Records an anonymous class. `base` is the type it is created from,
    /// recorded as inheritance from inside the class.
    fn visit_anonymous_class(
        &mut self,
        body: NodeId,
        base: Option<NodeId>,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::AnonymousClassBody { members } = tree.kind(body)? else {
            return Err(unexpected(body, "AnonymousClassBody", tree.kind(body)?));
        };

        let declared = self.declaration_name(body)?.serialize();
        let range = tree.range(body)?;
        self.recorder.record_symbol_with_location_and_scope(
            declared.clone(),
            SymbolKind::Class,
            Range::at(range.begin()),
            range,
            AccessKind::None,
            DefinitionKind::Explicit,
        );
        self.recorder.record_scope(self.path, range);

        let inner = ctx.push_one(declared);
        if let Some(base) = base {
            self.with_role(ReferenceRole::Inheritance, |this| this.visit(base, &inner))?;
        }
        self.with_role(ReferenceRole::TypeUsage, |this| this.visit_members(members, &inner))
    }

    /// Fields of one statement share a frame for the type and annotations;
    /// each initializer runs under its own variable only.
    fn visit_field_declaration(
        &mut self,
        node: NodeId,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::FieldDeclaration {
            modifiers,
            javadoc,
            annotations,
            ty,
            fragments,
        } = tree.kind(node)?
        else {
            return Err(unexpected(node, "FieldDeclaration", tree.kind(node)?));
        };

        self.record_javadoc(*javadoc)?;
        let mut variables = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let NodeKind::VariableFragment { name, initializer } = tree.kind(*fragment)? else {
                return Err(unexpected(*fragment, "VariableFragment", tree.kind(*fragment)?));
            };
            let declared = self.declaration_name(*fragment)?.serialize();
            self.recorder.record_symbol_with_location(
                declared.clone(),
                SymbolKind::Field,
                tree.range(*name)?,
                modifiers.visibility.into(),
                DefinitionKind::Explicit,
            );
            variables.push((declared, *initializer));
        }

        let statement = ctx.push(variables.iter().map(|(name, _)| name.clone()).collect());
        self.with_role(ReferenceRole::TypeUsage, |this| {
            this.visit_all(annotations, &statement)?;
            this.visit(*ty, &statement)?;
            for (declared, initializer) in variables {
                let own = ctx.push_one(declared);
                this.visit_opt(initializer, &own)?;
            }
            Ok(())
        })
    }

    fn visit_method(&mut self, node: NodeId, ctx: &ContextStack<'_>) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::MethodDeclaration {
            name,
            modifiers,
            javadoc,
            annotations,
            type_parameters,
            return_type,
            parameters,
            thrown,
            body,
            ..
        } = tree.kind(node)?
        else {
            return Err(unexpected(node, "MethodDeclaration", tree.kind(node)?));
        };

        let declared = self.declaration_name(node)?.serialize();
        let name_range = tree.range(*name)?;
        self.recorder.record_symbol_with_location_and_scope(
            declared.clone(),
            SymbolKind::Method,
            name_range,
            tree.range(node)?,
            modifiers.visibility.into(),
            DefinitionKind::Explicit,
        );
        self.record_javadoc(*javadoc)?;
        self.record_override(node, &declared, name_range)?;

        let inner = ctx.push_one(declared);
        self.with_role(ReferenceRole::TypeUsage, |this| {
            this.visit_all(annotations, &inner)?;
            this.visit_all(type_parameters, &inner)?;
            this.visit_opt(*return_type, &inner)?;
            this.visit_all(parameters, &inner)?;
            this.visit_all(thrown, &inner)?;
            this.visit_opt(*body, &inner)
        })
    }

    fn visit_instance_creation(
        &mut self,
        node: NodeId,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::ClassInstanceCreation {
            expression,
            type_arguments,
            ty,
            arguments,
            body,
        } = tree.kind(node)?
        else {
            return Err(unexpected(node, "ClassInstanceCreation", tree.kind(node)?));
        };

        self.visit_opt(*expression, ctx)?;
        self.visit_type_arguments(type_arguments, ctx)?;
        match body {
            Some(body) => {
                self.visit_all(arguments, ctx)?;
                self.visit_anonymous_class(*body, Some(*ty), ctx)
            }
            None => {
                self.record_invocation(node, tree.range(*ty)?, ReferenceKind::Call, ctx)?;
                self.visit(*ty, ctx)?;
                self.visit_all(arguments, ctx)
            }
        }
    }

    fn visit_method_reference(
        &mut self,
        node: NodeId,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let tree = self.tree;
        let NodeKind::MethodReference {
            flavor,
            qualifier,
            type_arguments,
            name,
        } = tree.kind(node)?
        else {
            return Err(unexpected(node, "MethodReference", tree.kind(node)?));
        };

        let node_range = tree.range(node)?;
        let range = match (flavor, name) {
            (MethodReferenceFlavor::Creation, _) => {
                let from = match qualifier {
                    Some(qualifier) => tree.range(*qualifier)?.end(),
                    None => node_range.begin(),
                };
                self.keyword_range_from("new", from, node_range)
            }
            (_, Some(name)) => tree.range(*name)?,
            (_, None) => node_range,
        };

        match self.oracle.resolve(node) {
            Resolution::Resolved(binding) => {
                self.record_method_use(node, binding, range, ReferenceKind::Usage, ctx)?;
            }
            Resolution::Unresolved(_) if self.is_array_type(*qualifier)? => {
                debug!("Skipping method reference on array type at {}", node_range);
            }
            Resolution::Unresolved(reason) => self.report_unresolved(node, reason)?,
        }

        self.visit_opt(*qualifier, ctx)?;
        self.visit_type_arguments(type_arguments, ctx)
    }

    fn record_override(&mut self, node: NodeId, declared: &str, range: Range) -> Result<(), DomainError> {
        let Some(method) = self.oracle.resolve(node).binding() else {
            return Ok(());
        };
        let Some(target) = self.oracle.override_target_of(method) else {
            return Ok(());
        };
        let Some(overridden) = self.name_binding(node, target)? else {
            return Ok(());
        };
        let overridden = overridden.serialize();
        self.recorder.record_symbol(
            overridden.clone(),
            SymbolKind::Method,
            AccessKind::None,
            DefinitionKind::None,
        );
        self.recorder.record_reference(
            ReferenceRole::Override.reference_kind(),
            overridden,
            declared.to_string(),
            range,
        );
        Ok(())
    }

    /// Resolves a reference node. Failures are recorded at the node.
    fn resolve_reference(&mut self, node: NodeId) -> Result<Option<BindingId>, DomainError> {
        match self.oracle.resolve(node) {
            Resolution::Resolved(binding) => Ok(Some(binding)),
            Resolution::Unresolved(reason) => {
                self.report_unresolved(node, reason)?;
                Ok(None)
            }
        }
    }

    fn record_invocation(
        &mut self,
        node: NodeId,
        range: Range,
        kind: ReferenceKind,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        match self.resolve_reference(node)? {
            Some(binding) => self.record_method_use(node, binding, range, kind, ctx),
            None => Ok(()),
        }
    }

    /// Fields and variables behind a qualified name or field access.
    /// Returns `false` when the reference could not be resolved.
    fn record_member_use(
        &mut self,
        node: NodeId,
        name: NodeId,
        ctx: &ContextStack<'_>,
    ) -> Result<bool, DomainError> {
        let range = self.tree.range(name)?;
        match self.oracle.resolve(node) {
            Resolution::Resolved(binding) => {
                self.record_binding_use(node, binding, range, ctx)?;
                Ok(true)
            }
            Resolution::Unresolved(_) if self.tree.identifier(name)? == "length" => {
                debug!("Skipping unresolved array length at {}", range);
                Ok(true)
            }
            Resolution::Unresolved(reason) => {
                self.report_unresolved(node, reason)?;
                Ok(false)
            }
        }
    }

    /// Records what a resolved expression name refers to.
    fn record_binding_use(
        &mut self,
        node: NodeId,
        binding: BindingId,
        range: Range,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let oracle = self.oracle;
        match oracle.binding(binding) {
            Some(Binding::Variable {
                name,
                flavor,
                declared_at,
                declaring_node,
                ..
            }) if flavor.is_local() => {
                match self.local_declaration_position(*declared_at, *declaring_node)? {
                    Some(position) => self
                        .recorder
                        .record_local_symbol(positional_name(self.path, position), range),
                    None => self.report(node, &NamingFailure::UndeclaredLocal(name.clone()))?,
                }
                Ok(())
            }
            Some(Binding::Variable { flavor, .. }) => {
                let Some(variable) = self.name_binding(node, binding)? else {
                    return Ok(());
                };
                let kind = match flavor {
                    VariableFlavor::EnumConstant => SymbolKind::EnumConstant,
                    _ => SymbolKind::Field,
                };
                let variable = variable.serialize();
                self.recorder.record_symbol(
                    variable.clone(),
                    kind,
                    AccessKind::None,
                    DefinitionKind::None,
                );
                self.record_references(ReferenceKind::Usage, &variable, ctx, range);
                Ok(())
            }
            Some(found) if found.is_type() => {
                let kind = self.roles.current().reference_kind();
                self.record_type_use(node, binding, range, kind, ctx)
            }
            _ => Ok(()),
        }
    }

    fn record_method_use(
        &mut self,
        node: NodeId,
        binding: BindingId,
        range: Range,
        kind: ReferenceKind,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let Some(method) = self.name_binding(node, binding)? else {
            return Ok(());
        };
        let method = method.serialize();
        self.recorder.record_symbol(
            method.clone(),
            SymbolKind::Method,
            AccessKind::None,
            DefinitionKind::None,
        );
        self.record_references(kind, &method, ctx, range);
        Ok(())
    }

    fn record_type_reference(
        &mut self,
        node: NodeId,
        range: Range,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let Some(binding) = self.resolve_reference(node)? else {
            return Ok(());
        };
        let kind = self.roles.current().reference_kind();
        self.record_type_use(node, binding, range, kind, ctx)
    }

    fn record_type_use(
        &mut self,
        node: NodeId,
        binding: BindingId,
        range: Range,
        kind: ReferenceKind,
        ctx: &ContextStack<'_>,
    ) -> Result<(), DomainError> {
        let result = self.namer.name_type_binding(binding, &IgnoredContexts::new());
        match self.settle(node, result)? {
            Some(Some(ty)) => {
                let referenced = ty.to_decl_name().serialize();
                self.record_references(kind, &referenced, ctx, range);
            }
            Some(None) => debug!("Type {} at {} could not be named", binding, range),
            None => {}
        }
        Ok(())
    }

    fn record_references(
        &mut self,
        kind: ReferenceKind,
        referenced: &str,
        ctx: &ContextStack<'_>,
        range: Range,
    ) {
        for context in ctx.current() {
            self.recorder
                .record_reference(kind, referenced.to_string(), context.clone(), range);
        }
    }

    /// Start of the name a local variable was declared with.
    fn local_declaration_position(
        &self,
        declared_at: Option<Position>,
        declaring_node: Option<NodeId>,
    ) -> Result<Option<Position>, DomainError> {
        if declared_at.is_some() {
            return Ok(declared_at);
        }
        let Some(node) = declaring_node else {
            return Ok(None);
        };
        let name = match self.tree.kind(node)? {
            NodeKind::Parameter { name, .. } | NodeKind::VariableFragment { name, .. } => *name,
            _ => node,
        };
        Ok(Some(self.tree.range(name)?.begin()))
    }

    fn record_local_declaration(&mut self, name: NodeId) -> Result<(), DomainError> {
        let range = self.tree.range(name)?;
        self.recorder
            .record_local_symbol(positional_name(self.path, range.begin()), range);
        Ok(())
    }

    fn record_javadoc(&mut self, javadoc: Option<NodeId>) -> Result<(), DomainError> {
        match javadoc {
            Some(comment) => self.record_comment(comment),
            None => Ok(()),
        }
    }

    fn record_comment(&mut self, comment: NodeId) -> Result<(), DomainError> {
        let range = self.tree.range(comment)?;
        if self.comments.insert(range) {
            self.recorder.record_comment(range);
        }
        Ok(())
    }

    /// Names a declaration node, falling back to the unsolved name.
    fn declaration_name(&mut self, node: NodeId) -> Result<DeclName, DomainError> {
        let result = self.namer.name_declaration(node, &IgnoredContexts::new());
        Ok(self.settle(node, result)?.unwrap_or_else(DeclName::unsolved))
    }

    /// Names a referenced declaration. `None` when it cannot be named.
    fn name_binding(&mut self, node: NodeId, binding: BindingId) -> Result<Option<DeclName>, DomainError> {
        let result = self.namer.name_binding(binding, &IgnoredContexts::new());
        match self.settle(node, result)? {
            Some(name) if name.is_unsolved() => {
                debug!("Reference to {} at {} is unsolved", binding, self.tree.range(node)?);
                Ok(None)
            }
            named => Ok(named),
        }
    }

    /// Turns a node-local failure into an error fact.
    fn settle<T>(&mut self, node: NodeId, result: Result<T, NamingFailure>) -> Result<Option<T>, DomainError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(NamingFailure::Invariant(e)) => Err(e),
            Err(failure) => {
                self.report(node, &failure)?;
                Ok(None)
            }
        }
    }

    fn report_unresolved(&mut self, node: NodeId, reason: UnresolvedReason) -> Result<(), DomainError> {
        let text = self.source.slice(self.tree.range(node)?);
        self.report(node, &NamingFailure::unresolved(reason, text))
    }

    fn report(&mut self, node: NodeId, failure: &NamingFailure) -> Result<(), DomainError> {
        let range = self.tree.range(node)?;
        debug!("{} at {} in {}", failure, range, self.path.display());
        self.recorder
            .record_error(failure.to_string(), false, true, range);
        Ok(())
    }

    fn keyword_range(&self, keyword: &str, node_range: Range) -> Range {
        self.keyword_range_from(keyword, node_range.begin(), node_range)
    }

    fn keyword_range_from(&self, keyword: &str, from: Position, fallback: Range) -> Range {
        self.source.find_range(keyword, from).unwrap_or(fallback)
    }

    fn is_array_type(&self, node: Option<NodeId>) -> Result<bool, DomainError> {
        Ok(match node {
            Some(node) => matches!(self.tree.kind(node)?, NodeKind::ArrayType { .. }),
            None => false,
        })
    }
}

fn type_symbol_kind(flavor: TypeFlavor) -> SymbolKind {
    match flavor {
        TypeFlavor::Class => SymbolKind::Class,
        TypeFlavor::Interface => SymbolKind::Interface,
        TypeFlavor::Enum => SymbolKind::Enum,
        TypeFlavor::Annotation => SymbolKind::Annotation,
        TypeFlavor::Record => SymbolKind::Record,
    }
}

fn unexpected(node: NodeId, expected: &str, found: &NodeKind) -> DomainError {
    DomainError::invariant(format!(
        "expected {} at {}, found {}",
        expected,
        node,
        found.label()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::application::test_support::*;
    use crate::domain::{CommentStyle, Fact, FileId, Modifiers};

    fn walk(unit: UnitFixture, root: NodeId, source: &str) -> (FactLog, Result<(), DomainError>) {
        walk_with(unit, root, source, Interrupt::new(), false)
    }

    fn walk_with(
        unit: UnitFixture,
        root: NodeId,
        source: &str,
        interrupt: Interrupt,
        verbose: bool,
    ) -> (FactLog, Result<(), DomainError>) {
        let (tree, oracle) = unit.finish(root);
        let source = SourceText::new(source);
        let log = FactLog::default();
        let result = {
            let recorder = Recorder::new(&log, FileId(1));
            let mut traversal =
                AstTraversal::new(&tree, &oracle, &source, Path::new("A.java"), recorder)
                    .with_interrupt(interrupt)
                    .with_verbose(verbose);
            traversal.run()
        };
        (log, result)
    }

    /// Ranges of references of `kind`, in recording order.
    fn reference_ranges(log: &FactLog, kind: ReferenceKind) -> Vec<Range> {
        log.facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::Reference {
                    kind: found, range, ..
                } if found == kind => Some(range),
                _ => None,
            })
            .collect()
    }

    fn local_ranges(log: &FactLog, name: &str) -> Vec<Range> {
        log.facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::LocalSymbol {
                    name: found, range, ..
                } if found == name => Some(range),
                _ => None,
            })
            .collect()
    }

    /// A dotted name starting at `column`, built as nested qualified names.
    fn dotted(unit: &mut UnitFixture, segments: &[&str], line: u32, column: u32) -> NodeId {
        let mut node = unit.name(segments[0], line, column);
        let mut end = column + segments[0].len() as u32 - 1;
        for segment in &segments[1..] {
            let start = end + 2;
            let name = unit.name(segment, line, start);
            end = start + segment.len() as u32 - 1;
            node = unit.node(
                NodeKind::QualifiedName {
                    qualifier: node,
                    name,
                },
                Range::new(line, column, line, end),
            );
        }
        node
    }

    fn simple_type(unit: &mut UnitFixture, identifier: &str, line: u32, column: u32, binding: BindingId) -> NodeId {
        let name = unit.name(identifier, line, column);
        let end = column + identifier.len() as u32 - 1;
        let ty = unit.node(NodeKind::SimpleType { name }, Range::new(line, column, line, end));
        unit.resolve(ty, binding);
        ty
    }

    /// `package p;` on line 1.
    fn package_p(unit: &mut UnitFixture) -> (NodeId, BindingId) {
        let name = unit.name("p", 1, 9);
        let node = unit.node(
            NodeKind::PackageDeclaration {
                name,
                annotations: vec![],
            },
            Range::new(1, 1, 1, 10),
        );
        let binding = unit.binding(Binding::Package { name: "p".into() });
        (node, binding)
    }

    fn class_declaration(
        unit: &mut UnitFixture,
        name: NodeId,
        superclass: Option<NodeId>,
        members: Vec<NodeId>,
        range: Range,
    ) -> NodeId {
        unit.node(
            NodeKind::TypeDeclaration {
                flavor: TypeFlavor::Class,
                name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                type_parameters: vec![],
                superclass,
                interfaces: vec![],
                enum_constants: vec![],
                members,
            },
            range,
        )
    }

    fn method_declaration(
        unit: &mut UnitFixture,
        name: NodeId,
        return_type: NodeId,
        body: NodeId,
        range: Range,
    ) -> NodeId {
        unit.node(
            NodeKind::MethodDeclaration {
                name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                is_constructor: false,
                type_parameters: vec![],
                return_type: Some(return_type),
                parameters: vec![],
                thrown: vec![],
                body: Some(body),
            },
            range,
        )
    }

    fn primitive(unit: &mut UnitFixture, keyword: &str, line: u32, column: u32) -> NodeId {
        let end = column + keyword.len() as u32 - 1;
        unit.node(
            NodeKind::PrimitiveType {
                keyword: keyword.into(),
            },
            Range::new(line, column, line, end),
        )
    }

    fn call(unit: &mut UnitFixture, name: &str, line: u32, column: u32) -> NodeId {
        let name_node = unit.name(name, line, column);
        let end = column + name.len() as u32 + 1;
        unit.node(
            NodeKind::MethodInvocation {
                expression: None,
                type_arguments: vec![],
                name: name_node,
                arguments: vec![],
            },
            Range::new(line, column, line, end),
        )
    }

    fn compilation_unit(unit: &mut UnitFixture, package: NodeId, types: Vec<NodeId>, end_line: u32) -> NodeId {
        unit.node(
            NodeKind::CompilationUnit {
                package: Some(package),
                imports: vec![],
                types,
            },
            Range::new(1, 1, end_line, 1),
        )
    }

    fn field_binding(name: &str, ty: BindingId, parent: BindingId) -> Binding {
        Binding::Variable {
            name: name.into(),
            flavor: VariableFlavor::Field,
            ty: Some(ty),
            parent: Some(parent),
            is_static: false,
            declared_at: None,
            declaring_node: None,
        }
    }

    fn add_methods(unit: &mut UnitFixture, ty: BindingId, added: &[BindingId]) {
        if let Binding::Type { methods, .. } = unit.binding_mut(ty) {
            methods.extend_from_slice(added);
        }
    }

    const FIELDS: &str = "package p;\nclass C {\n  int a = f(), b;\n  int f() { return 0; }\n}";

    fn fields_unit() -> (UnitFixture, NodeId) {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let int = unit.binding(Binding::Primitive { name: "int".into() });
        let f = unit.binding(method_binding("f", &[], Some(int), vec![], class_binding_id));
        let a = unit.binding(field_binding("a", int, class_binding_id));
        let b = unit.binding(field_binding("b", int, class_binding_id));

        let field_type = primitive(&mut unit, "int", 3, 3);
        let a_name = unit.name("a", 3, 7);
        let f_call = call(&mut unit, "f", 3, 11);
        unit.resolve(f_call, f);
        let a_fragment = unit.node(
            NodeKind::VariableFragment {
                name: a_name,
                initializer: Some(f_call),
            },
            Range::new(3, 7, 3, 13),
        );
        let b_name = unit.name("b", 3, 16);
        let b_fragment = unit.node(
            NodeKind::VariableFragment {
                name: b_name,
                initializer: None,
            },
            Range::new(3, 16, 3, 16),
        );
        let field = unit.node(
            NodeKind::FieldDeclaration {
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                ty: field_type,
                fragments: vec![a_fragment, b_fragment],
            },
            Range::new(3, 3, 3, 17),
        );

        let return_type = primitive(&mut unit, "int", 4, 3);
        let f_name = unit.name("f", 4, 7);
        let statement = unit.node(
            NodeKind::Other {
                label: "ReturnStatement".into(),
                children: vec![],
            },
            Range::new(4, 13, 4, 21),
        );
        let body = unit.node(
            NodeKind::Block {
                statements: vec![statement],
            },
            Range::new(4, 11, 4, 23),
        );
        let method = method_declaration(&mut unit, f_name, return_type, body, Range::new(4, 3, 4, 23));

        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![field, method], Range::new(2, 1, 5, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 5);

        unit.declare(class_binding_id, class);
        unit.declare(f, method);
        unit.declare(a, a_fragment);
        unit.declare(b, b_fragment);
        (unit, root)
    }

    #[test]
    fn test_declarations_are_recorded_with_full_names() {
        let (unit, root) = fields_unit();
        let (log, result) = walk(unit, root, FIELDS);
        result.unwrap();

        assert_eq!(
            log.declared(),
            vec!["p", "p.C", "int p.C.a", "int p.C.b", "int p.C.f()"]
        );
        assert!(log.errors().is_empty());
    }

    #[test]
    fn test_field_initializer_is_attributed_to_its_own_variable() {
        let (unit, root) = fields_unit();
        let (log, result) = walk(unit, root, FIELDS);
        result.unwrap();

        assert_eq!(
            log.references(ReferenceKind::Call),
            vec![("int p.C.f()".to_string(), "int p.C.a".to_string())]
        );
        let usages = log.references(ReferenceKind::TypeUsage);
        assert!(usages.contains(&("int".to_string(), "int p.C.a".to_string())));
        assert!(usages.contains(&("int".to_string(), "int p.C.b".to_string())));
        assert!(usages.contains(&("int".to_string(), "int p.C.f()".to_string())));
    }

    #[test]
    fn test_class_body_and_block_scopes() {
        let (unit, root) = fields_unit();
        let (log, result) = walk(unit, root, FIELDS);
        result.unwrap();

        let locals: Vec<(String, Range)> = log
            .facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::LocalSymbol { name, range, .. } => Some((name, range)),
                _ => None,
            })
            .collect();
        assert_eq!(
            locals,
            vec![
                ("A.java<2:9>".to_string(), Range::new(2, 9, 2, 9)),
                ("A.java<2:9>".to_string(), Range::new(5, 1, 5, 1)),
                ("A.java<4:11>".to_string(), Range::new(4, 11, 4, 11)),
                ("A.java<4:11>".to_string(), Range::new(4, 23, 4, 23)),
            ]
        );
    }

    const CALLS: &str = "package p;\nclass C {\n  void m() { g(); h(); }\n}";

    #[test]
    fn test_unresolved_call_records_one_error_and_walk_continues() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let void = unit.binding(Binding::Primitive { name: "void".into() });
        let m = unit.binding(method_binding("m", &[], Some(void), vec![], class_binding_id));
        let h = unit.binding(method_binding("h", &[], Some(void), vec![], class_binding_id));

        let return_type = primitive(&mut unit, "void", 3, 3);
        let m_name = unit.name("m", 3, 8);
        let g_call = call(&mut unit, "g", 3, 14);
        let h_call = call(&mut unit, "h", 3, 19);
        unit.resolve(h_call, h);
        let body = unit.node(
            NodeKind::Block {
                statements: vec![g_call, h_call],
            },
            Range::new(3, 12, 3, 24),
        );
        let method = method_declaration(&mut unit, m_name, return_type, body, Range::new(3, 3, 3, 24));
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![method], Range::new(2, 1, 4, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 4);
        unit.declare(class_binding_id, class);
        unit.declare(m, method);

        let (log, result) = walk(unit, root, CALLS);
        result.unwrap();

        let errors = log.errors();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            Fact::Error {
                message,
                fatal,
                indexed,
                range,
                ..
            } => {
                assert!(message.contains("g()"), "{}", message);
                assert!(!fatal);
                assert!(indexed);
                assert_eq!(*range, Range::new(3, 14, 3, 16));
            }
            other => panic!("unexpected fact {:?}", other),
        }
        assert_eq!(
            log.references(ReferenceKind::Call),
            vec![("void p.C.h()".to_string(), "void p.C.m()".to_string())]
        );
    }

    const OVERRIDE: &str =
        "package p;\nclass B { void m() {} }\nclass D extends B { void m() {} }\n";

    #[test]
    fn test_override_and_inheritance_references() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let base = unit.binding(class_binding("B", &[], p));
        let derived = unit.binding(class_binding("D", &[], p));
        let void = unit.binding(Binding::Primitive { name: "void".into() });
        let base_m = unit.binding(method_binding("m", &[], Some(void), vec![], base));
        let derived_m = unit.binding(method_binding("m", &[], Some(void), vec![], derived));
        add_methods(&mut unit, base, &[base_m]);
        add_methods(&mut unit, derived, &[derived_m]);
        if let Binding::Type { supertypes, .. } = unit.binding_mut(derived) {
            supertypes.push(base);
        }

        let base_return = primitive(&mut unit, "void", 2, 11);
        let base_m_name = unit.name("m", 2, 16);
        let base_body = unit.node(NodeKind::Block { statements: vec![] }, Range::new(2, 20, 2, 21));
        let base_method =
            method_declaration(&mut unit, base_m_name, base_return, base_body, Range::new(2, 11, 2, 21));
        let b_name = unit.name("B", 2, 7);
        let base_class = class_declaration(&mut unit, b_name, None, vec![base_method], Range::new(2, 1, 2, 23));

        let derived_return = primitive(&mut unit, "void", 3, 21);
        let derived_m_name = unit.name("m", 3, 26);
        let derived_body = unit.node(NodeKind::Block { statements: vec![] }, Range::new(3, 30, 3, 31));
        let derived_method = method_declaration(
            &mut unit,
            derived_m_name,
            derived_return,
            derived_body,
            Range::new(3, 21, 3, 31),
        );
        let superclass_name = unit.name("B", 3, 17);
        let superclass = unit.node(NodeKind::SimpleType { name: superclass_name }, Range::new(3, 17, 3, 17));
        unit.resolve(superclass, base);
        let d_name = unit.name("D", 3, 7);
        let derived_class = class_declaration(
            &mut unit,
            d_name,
            Some(superclass),
            vec![derived_method],
            Range::new(3, 1, 3, 33),
        );
        let root = compilation_unit(&mut unit, package, vec![base_class, derived_class], 3);
        unit.declare(base, base_class);
        unit.declare(derived, derived_class);
        unit.declare(base_m, base_method);
        unit.declare(derived_m, derived_method);

        let (log, result) = walk(unit, root, OVERRIDE);
        result.unwrap();

        assert_eq!(
            log.references(ReferenceKind::Inheritance),
            vec![("p.B".to_string(), "p.D".to_string())]
        );
        assert_eq!(
            log.references(ReferenceKind::Override),
            vec![("void p.B.m()".to_string(), "void p.D.m()".to_string())]
        );
        assert!(log.errors().is_empty());
    }

    const ANONYMOUS: &str = "package p;\nclass C {\n  Base o = new Base() { };\n}";

    #[test]
    fn test_anonymous_class_is_named_by_position() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let base = unit.binding(class_binding("Base", &[], p));
        let o = unit.binding(field_binding("o", base, class_binding_id));

        let field_type_name = unit.name("Base", 3, 3);
        let field_type = unit.node(NodeKind::SimpleType { name: field_type_name }, Range::new(3, 3, 3, 6));
        unit.resolve(field_type, base);
        let o_name = unit.name("o", 3, 8);
        let created_name = unit.name("Base", 3, 16);
        let created = unit.node(NodeKind::SimpleType { name: created_name }, Range::new(3, 16, 3, 19));
        unit.resolve(created, base);
        let body = unit.node(NodeKind::AnonymousClassBody { members: vec![] }, Range::new(3, 23, 3, 25));
        let creation = unit.node(
            NodeKind::ClassInstanceCreation {
                expression: None,
                type_arguments: vec![],
                ty: created,
                arguments: vec![],
                body: Some(body),
            },
            Range::new(3, 12, 3, 25),
        );
        let fragment = unit.node(
            NodeKind::VariableFragment {
                name: o_name,
                initializer: Some(creation),
            },
            Range::new(3, 8, 3, 25),
        );
        let field = unit.node(
            NodeKind::FieldDeclaration {
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                ty: field_type,
                fragments: vec![fragment],
            },
            Range::new(3, 3, 3, 26),
        );
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![field], Range::new(2, 1, 4, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 4);
        unit.declare(class_binding_id, class);
        unit.declare(o, fragment);

        let (log, result) = walk(unit, root, ANONYMOUS);
        result.unwrap();

        let anonymous = "p.C.anonymous class (A.java<3:23>)".to_string();
        assert!(log.declared().contains(&anonymous));
        assert_eq!(
            log.references(ReferenceKind::Inheritance),
            vec![("p.Base".to_string(), anonymous)]
        );
        assert_eq!(
            log.references(ReferenceKind::TypeUsage),
            vec![("p.Base".to_string(), "p.Base p.C.o".to_string())]
        );
    }

    #[test]
    fn test_interrupt_skips_remaining_types() {
        let (unit, root) = fields_unit();
        let interrupt = Interrupt::new();
        interrupt.interrupt();
        let (log, result) = walk_with(unit, root, FIELDS, interrupt, false);
        result.unwrap();

        assert_eq!(log.declared(), vec!["p"]);
    }

    #[test]
    fn test_malformed_field_statement_stops_the_walk() {
        let mut unit = UnitFixture::new();
        let (package, _) = package_p(&mut unit);
        let field_type = primitive(&mut unit, "int", 3, 3);
        let stray = unit.name("a", 3, 7);
        let field = unit.node(
            NodeKind::FieldDeclaration {
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                ty: field_type,
                fragments: vec![stray],
            },
            Range::new(3, 3, 3, 8),
        );
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![field], Range::new(2, 1, 4, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 4);

        let (_, result) = walk(unit, root, "package p;\nclass C {\n  int a;\n}");
        assert!(result.unwrap_err().is_invariant_violation());
    }

    const DOCUMENTED: &str = "package p;\n/** Doc. */\nclass C {\n  // note\n}\n";

    #[test]
    fn test_javadoc_in_free_comment_list_is_recorded_once() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let doc = unit.node(NodeKind::Comment { style: CommentStyle::Javadoc }, Range::new(2, 1, 2, 11));
        let note = unit.node(NodeKind::Comment { style: CommentStyle::Line }, Range::new(4, 3, 4, 9));
        unit.comment(doc);
        unit.comment(note);
        let c_name = unit.name("C", 3, 7);
        let class = unit.node(
            NodeKind::TypeDeclaration {
                flavor: TypeFlavor::Class,
                name: c_name,
                modifiers: Modifiers::default(),
                javadoc: Some(doc),
                annotations: vec![],
                type_parameters: vec![],
                superclass: None,
                interfaces: vec![],
                enum_constants: vec![],
                members: vec![],
            },
            Range::new(2, 1, 5, 1),
        );
        let root = compilation_unit(&mut unit, package, vec![class], 5);
        unit.declare(class_binding_id, class);

        let (log, result) = walk(unit, root, DOCUMENTED);
        result.unwrap();

        let comments: Vec<Range> = log
            .facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::Comment { range, .. } => Some(range),
                _ => None,
            })
            .collect();
        assert_eq!(comments, vec![Range::new(2, 1, 2, 11), Range::new(4, 3, 4, 9)]);
    }

    const IMPORTS: &str = "package p;
import java.util.List;
import static java.lang.Math.max;
import java.io.*;
class C {}
";

    #[test]
    fn test_imports_are_referenced_from_the_file() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let java_util = unit.binding(Binding::Package { name: "java.util".into() });
        let java_lang = unit.binding(Binding::Package { name: "java.lang".into() });
        let java_io = unit.binding(Binding::Package { name: "java.io".into() });
        let list = unit.binding(class_binding("List", &["E"], java_util));
        let math = unit.binding(class_binding("Math", &[], java_lang));
        let int = unit.binding(Binding::Primitive { name: "int".into() });
        let max = unit.binding(method_binding("max", &[], Some(int), vec![int, int], math));
        if let Binding::Method { is_static, .. } = unit.binding_mut(max) {
            *is_static = true;
        }

        let list_name = dotted(&mut unit, &["java", "util", "List"], 2, 8);
        let list_import = unit.node(
            NodeKind::ImportDeclaration {
                name: list_name,
                is_static: false,
                on_demand: false,
            },
            Range::new(2, 1, 2, 22),
        );
        unit.resolve(list_import, list);
        let max_name = dotted(&mut unit, &["java", "lang", "Math", "max"], 3, 15);
        let max_import = unit.node(
            NodeKind::ImportDeclaration {
                name: max_name,
                is_static: true,
                on_demand: false,
            },
            Range::new(3, 1, 3, 33),
        );
        unit.resolve(max_import, max);
        let io_name = dotted(&mut unit, &["java", "io"], 4, 8);
        let io_import = unit.node(
            NodeKind::ImportDeclaration {
                name: io_name,
                is_static: false,
                on_demand: true,
            },
            Range::new(4, 1, 4, 17),
        );
        unit.resolve(io_import, java_io);

        let c_name = unit.name("C", 5, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![], Range::new(5, 1, 5, 10));
        let root = unit.node(
            NodeKind::CompilationUnit {
                package: Some(package),
                imports: vec![list_import, max_import, io_import],
                types: vec![class],
            },
            Range::new(1, 1, 6, 1),
        );
        unit.declare(class_binding_id, class);

        let (log, result) = walk(unit, root, IMPORTS);
        result.unwrap();

        assert_eq!(
            log.references(ReferenceKind::Import),
            vec![
                ("java.util.List<E>".to_string(), "A.java".to_string()),
                ("static int java.lang.Math.max(int, int)".to_string(), "A.java".to_string()),
                ("java.io".to_string(), "A.java".to_string()),
            ]
        );
        assert_eq!(
            reference_ranges(&log, ReferenceKind::Import),
            vec![Range::new(2, 18, 2, 21), Range::new(3, 30, 3, 32), Range::new(4, 13, 4, 14)]
        );
        assert!(log.facts().iter().any(|fact| matches!(
            fact,
            Fact::Symbol { name, kind: SymbolKind::Package, .. } if display(name) == "java.io"
        )));
        assert!(log.errors().is_empty());
    }

    const TYPE_ARGUMENTS: &str = "package p;
class C {
  List<String> names() { return Collections.<String>emptyList(); }
}
";

    #[test]
    fn test_type_arguments_use_their_own_role() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let java_util = unit.binding(Binding::Package { name: "java.util".into() });
        let java_lang = unit.binding(Binding::Package { name: "java.lang".into() });
        let list = unit.binding(class_binding("List", &["E"], java_util));
        let string = unit.binding(class_binding("String", &[], java_lang));
        let collections = unit.binding(class_binding("Collections", &[], java_util));
        let list_of_string = unit.binding(Binding::Parameterized {
            declaration: list,
            arguments: vec![string],
        });
        let names = unit.binding(method_binding("names", &[], Some(list_of_string), vec![], class_binding_id));
        let empty_list = unit.binding(method_binding("emptyList", &["T"], None, vec![], collections));

        let list_type = simple_type(&mut unit, "List", 3, 3, list);
        let string_argument = simple_type(&mut unit, "String", 3, 8, string);
        let return_type = unit.node(
            NodeKind::ParameterizedType {
                ty: list_type,
                arguments: vec![string_argument],
            },
            Range::new(3, 3, 3, 14),
        );
        unit.resolve(return_type, list_of_string);
        let names_name = unit.name("names", 3, 16);

        let receiver = unit.name("Collections", 3, 33);
        unit.resolve(receiver, collections);
        let explicit_argument = simple_type(&mut unit, "String", 3, 46, string);
        let called = unit.name("emptyList", 3, 53);
        let invocation = unit.node(
            NodeKind::MethodInvocation {
                expression: Some(receiver),
                type_arguments: vec![explicit_argument],
                name: called,
                arguments: vec![],
            },
            Range::new(3, 33, 3, 63),
        );
        unit.resolve(invocation, empty_list);
        let statement = unit.node(
            NodeKind::Other {
                label: "ReturnStatement".into(),
                children: vec![invocation],
            },
            Range::new(3, 26, 3, 64),
        );
        let body = unit.node(NodeKind::Block { statements: vec![statement] }, Range::new(3, 24, 3, 66));
        let method = method_declaration(&mut unit, names_name, return_type, body, Range::new(3, 3, 3, 66));
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![method], Range::new(2, 1, 4, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 4);
        unit.declare(class_binding_id, class);
        unit.declare(names, method);

        let (log, result) = walk(unit, root, TYPE_ARGUMENTS);
        result.unwrap();

        let context = "java.util.List<java.lang.String> p.C.names()".to_string();
        assert_eq!(
            log.references(ReferenceKind::TypeArgument),
            vec![
                ("java.lang.String".to_string(), context.clone()),
                ("java.lang.String".to_string(), context.clone()),
            ]
        );
        assert_eq!(
            reference_ranges(&log, ReferenceKind::TypeArgument),
            vec![Range::new(3, 8, 3, 13), Range::new(3, 46, 3, 51)]
        );
        // The receiver comes after the return type's arguments and is a plain usage again.
        assert_eq!(
            log.references(ReferenceKind::TypeUsage),
            vec![
                ("java.util.List<E>".to_string(), context.clone()),
                ("java.util.Collections".to_string(), context.clone()),
            ]
        );
        assert_eq!(
            log.references(ReferenceKind::Call),
            vec![("java.util.Collections.emptyList<T>()".to_string(), context)]
        );
        assert!(log.errors().is_empty());
    }

    const ANNOTATED: &str = "package p;\n@Deprecated(since = \"9\")\nclass C {}\n";

    #[test]
    fn test_annotation_and_member_value_usages() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let java_lang = unit.binding(Binding::Package { name: "java.lang".into() });
        let string = unit.binding(class_binding("String", &[], java_lang));
        let deprecated = unit.binding(class_binding("Deprecated", &[], java_lang));
        let since = unit.binding(Binding::Method {
            name: "since".into(),
            type_parameters: vec![],
            return_type: Some(string),
            parameters: vec![],
            parent: Some(deprecated),
            is_static: false,
            is_constructor: false,
            is_annotation_member: true,
            declaration: None,
            declaring_node: None,
        });

        let type_name = unit.name("Deprecated", 2, 2);
        let since_name = unit.name("since", 2, 13);
        let literal = unit.node(
            NodeKind::Other {
                label: "StringLiteral".into(),
                children: vec![],
            },
            Range::new(2, 21, 2, 23),
        );
        let pair = unit.node(
            NodeKind::MemberValuePair {
                name: since_name,
                value: literal,
            },
            Range::new(2, 13, 2, 23),
        );
        unit.resolve(pair, since);
        let annotation = unit.node(
            NodeKind::Annotation {
                type_name,
                values: vec![pair],
            },
            Range::new(2, 1, 2, 24),
        );
        unit.resolve(annotation, deprecated);
        let c_name = unit.name("C", 3, 7);
        let class = unit.node(
            NodeKind::TypeDeclaration {
                flavor: TypeFlavor::Class,
                name: c_name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![annotation],
                type_parameters: vec![],
                superclass: None,
                interfaces: vec![],
                enum_constants: vec![],
                members: vec![],
            },
            Range::new(2, 1, 3, 10),
        );
        let root = compilation_unit(&mut unit, package, vec![class], 4);
        unit.declare(class_binding_id, class);

        let (log, result) = walk(unit, root, ANNOTATED);
        result.unwrap();

        assert_eq!(
            log.references(ReferenceKind::AnnotationUsage),
            vec![("java.lang.Deprecated".to_string(), "p.C".to_string())]
        );
        assert_eq!(
            reference_ranges(&log, ReferenceKind::AnnotationUsage),
            vec![Range::new(2, 2, 2, 11)]
        );
        assert_eq!(
            log.references(ReferenceKind::Usage),
            vec![("java.lang.String java.lang.Deprecated.since".to_string(), "p.C".to_string())]
        );
        assert_eq!(reference_ranges(&log, ReferenceKind::Usage), vec![Range::new(2, 13, 2, 17)]);
    }

    const ENUM: &str = "package p;\nenum E {\n  A,\n  B { }\n}\n";

    #[test]
    fn test_enum_constants_and_constant_bodies() {
        let mut unit = UnitFixture::new();
        let (package, _) = package_p(&mut unit);
        let a_name = unit.name("A", 3, 3);
        let a = unit.node(
            NodeKind::EnumConstant {
                name: a_name,
                javadoc: None,
                annotations: vec![],
                arguments: vec![],
                body: None,
            },
            Range::new(3, 3, 3, 3),
        );
        let b_name = unit.name("B", 4, 3);
        let b_body = unit.node(NodeKind::AnonymousClassBody { members: vec![] }, Range::new(4, 5, 4, 7));
        let b = unit.node(
            NodeKind::EnumConstant {
                name: b_name,
                javadoc: None,
                annotations: vec![],
                arguments: vec![],
                body: Some(b_body),
            },
            Range::new(4, 3, 4, 7),
        );
        let e_name = unit.name("E", 2, 6);
        let enumeration = unit.node(
            NodeKind::TypeDeclaration {
                flavor: TypeFlavor::Enum,
                name: e_name,
                modifiers: Modifiers::default(),
                javadoc: None,
                annotations: vec![],
                type_parameters: vec![],
                superclass: None,
                interfaces: vec![],
                enum_constants: vec![a, b],
                members: vec![],
            },
            Range::new(2, 1, 5, 1),
        );
        let root = compilation_unit(&mut unit, package, vec![enumeration], 5);

        let (log, result) = walk(unit, root, ENUM);
        result.unwrap();

        assert_eq!(
            log.declared(),
            vec!["p", "p.E", "p.E.A", "p.E.B", "p.E.B.anonymous class (A.java<4:5>)"]
        );
        let kinds: Vec<(String, SymbolKind)> = log
            .facts()
            .into_iter()
            .filter_map(|fact| match fact {
                Fact::SymbolWithLocation { name, kind, .. }
                | Fact::SymbolWithLocationAndScope { name, kind, .. } => Some((display(&name), kind)),
                _ => None,
            })
            .collect();
        assert!(kinds.contains(&("p.E".to_string(), SymbolKind::Enum)));
        assert!(kinds.contains(&("p.E.A".to_string(), SymbolKind::EnumConstant)));
        assert!(kinds.contains(&("p.E.B.anonymous class (A.java<4:5>)".to_string(), SymbolKind::Class)));
        assert!(log.references(ReferenceKind::Inheritance).is_empty());
        assert!(log.errors().is_empty());
    }

    const LAMBDA_AND_CATCH: &str = "package p;
class C {
  void m() {
    run(s -> s);
    try { } catch (Exception e) { }
  }
}
";

    #[test]
    fn test_lambda_and_catch_parameters_are_locals() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let java_lang = unit.binding(Binding::Package { name: "java.lang".into() });
        let exception = unit.binding(class_binding("Exception", &[], java_lang));
        let void = unit.binding(Binding::Primitive { name: "void".into() });
        let m = unit.binding(method_binding("m", &[], Some(void), vec![], class_binding_id));
        let run = unit.binding(method_binding("run", &[], Some(void), vec![], class_binding_id));
        let s = unit.binding(Binding::Variable {
            name: "s".into(),
            flavor: VariableFlavor::Parameter,
            ty: None,
            parent: Some(m),
            is_static: false,
            declared_at: None,
            declaring_node: None,
        });

        let s_name = unit.name("s", 4, 9);
        let s_parameter = unit.node(
            NodeKind::Parameter {
                name: s_name,
                annotations: vec![],
                ty: None,
                varargs: false,
            },
            Range::new(4, 9, 4, 9),
        );
        let s_use = unit.name("s", 4, 14);
        unit.resolve(s_use, s);
        let lambda = unit.node(
            NodeKind::Lambda {
                parameters: vec![s_parameter],
                body: s_use,
            },
            Range::new(4, 9, 4, 14),
        );
        let run_name = unit.name("run", 4, 5);
        let run_call = unit.node(
            NodeKind::MethodInvocation {
                expression: None,
                type_arguments: vec![],
                name: run_name,
                arguments: vec![lambda],
            },
            Range::new(4, 5, 4, 15),
        );
        unit.resolve(run_call, run);

        let try_body = unit.node(NodeKind::Block { statements: vec![] }, Range::new(5, 9, 5, 11));
        let exception_type = simple_type(&mut unit, "Exception", 5, 20, exception);
        let e_name = unit.name("e", 5, 30);
        let e_parameter = unit.node(
            NodeKind::Parameter {
                name: e_name,
                annotations: vec![],
                ty: Some(exception_type),
                varargs: false,
            },
            Range::new(5, 20, 5, 30),
        );
        let catch_body = unit.node(NodeKind::Block { statements: vec![] }, Range::new(5, 33, 5, 35));
        let catch = unit.node(
            NodeKind::CatchClause {
                parameter: e_parameter,
                body: catch_body,
            },
            Range::new(5, 13, 5, 35),
        );
        let try_statement = unit.node(
            NodeKind::TryStatement {
                resources: vec![],
                body: try_body,
                catches: vec![catch],
                finally: None,
            },
            Range::new(5, 5, 5, 35),
        );

        let body = unit.node(
            NodeKind::Block {
                statements: vec![run_call, try_statement],
            },
            Range::new(3, 12, 6, 3),
        );
        let return_type = primitive(&mut unit, "void", 3, 3);
        let m_name = unit.name("m", 3, 8);
        let method = method_declaration(&mut unit, m_name, return_type, body, Range::new(3, 3, 6, 3));
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![method], Range::new(2, 1, 7, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 7);
        unit.declare(class_binding_id, class);
        unit.declare(m, method);
        unit.declare(s, s_parameter);

        let (log, result) = walk(unit, root, LAMBDA_AND_CATCH);
        result.unwrap();

        assert_eq!(
            local_ranges(&log, "A.java<4:9>"),
            vec![Range::new(4, 9, 4, 9), Range::new(4, 14, 4, 14)]
        );
        assert_eq!(local_ranges(&log, "A.java<5:30>"), vec![Range::new(5, 30, 5, 30)]);
        assert!(log
            .references(ReferenceKind::TypeUsage)
            .contains(&("java.lang.Exception".to_string(), "void p.C.m()".to_string())));
        assert!(log.errors().is_empty());
    }

    const LOCALS: &str = "package p;
class C {
  void m() {
    int n = 1;
    use(n, k);
  }
}
";

    #[test]
    fn test_local_usage_is_named_after_its_declaring_node() {
        let mut unit = UnitFixture::new();
        let (package, p) = package_p(&mut unit);
        let class_binding_id = unit.binding(class_binding("C", &[], p));
        let int = unit.binding(Binding::Primitive { name: "int".into() });
        let void = unit.binding(Binding::Primitive { name: "void".into() });
        let m = unit.binding(method_binding("m", &[], Some(void), vec![], class_binding_id));
        let use_method = unit.binding(method_binding("use", &[], Some(void), vec![int, int], class_binding_id));
        let local = |name: &str| Binding::Variable {
            name: name.into(),
            flavor: VariableFlavor::Local,
            ty: Some(int),
            parent: Some(m),
            is_static: false,
            declared_at: None,
            declaring_node: None,
        };
        let n = unit.binding(local("n"));
        let k = unit.binding(local("k"));

        let int_type = primitive(&mut unit, "int", 4, 5);
        let n_name = unit.name("n", 4, 9);
        let literal = unit.node(
            NodeKind::Other {
                label: "NumberLiteral".into(),
                children: vec![],
            },
            Range::new(4, 13, 4, 13),
        );
        let fragment = unit.node(
            NodeKind::VariableFragment {
                name: n_name,
                initializer: Some(literal),
            },
            Range::new(4, 9, 4, 13),
        );
        let declaration = unit.node(
            NodeKind::LocalVariableDeclaration {
                annotations: vec![],
                ty: int_type,
                fragments: vec![fragment],
            },
            Range::new(4, 5, 4, 14),
        );
        let n_use = unit.name("n", 5, 9);
        unit.resolve(n_use, n);
        let k_use = unit.name("k", 5, 12);
        unit.resolve(k_use, k);
        let use_name = unit.name("use", 5, 5);
        let use_call = unit.node(
            NodeKind::MethodInvocation {
                expression: None,
                type_arguments: vec![],
                name: use_name,
                arguments: vec![n_use, k_use],
            },
            Range::new(5, 5, 5, 13),
        );
        unit.resolve(use_call, use_method);
        let body = unit.node(
            NodeKind::Block {
                statements: vec![declaration, use_call],
            },
            Range::new(3, 12, 6, 3),
        );
        let return_type = primitive(&mut unit, "void", 3, 3);
        let m_name = unit.name("m", 3, 8);
        let method = method_declaration(&mut unit, m_name, return_type, body, Range::new(3, 3, 6, 3));
        let c_name = unit.name("C", 2, 7);
        let class = class_declaration(&mut unit, c_name, None, vec![method], Range::new(2, 1, 7, 1));
        let root = compilation_unit(&mut unit, package, vec![class], 7);
        unit.declare(class_binding_id, class);
        unit.declare(m, method);
        unit.declare(n, fragment);

        let (log, result) = walk(unit, root, LOCALS);
        result.unwrap();

        assert_eq!(
            local_ranges(&log, "A.java<4:9>"),
            vec![Range::new(4, 9, 4, 9), Range::new(5, 9, 5, 9)]
        );
        assert!(local_ranges(&log, "A.java<5:12>").is_empty());
        let errors = log.errors();
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            Fact::Error {
                message,
                fatal,
                indexed,
                range,
                ..
            } => {
                assert_eq!(message, "undeclared local: k");
                assert!(!fatal);
                assert!(indexed);
                assert_eq!(*range, Range::new(5, 12, 5, 12));
            }
            other => panic!("unexpected fact {:?}", other),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_verbose_walk_dumps_nodes_and_records_the_same_facts() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let (verbose, result) = tracing::subscriber::with_default(subscriber, || {
            let (unit, root) = fields_unit();
            walk_with(unit, root, FIELDS, Interrupt::new(), true)
        });
        result.unwrap();

        let (unit, root) = fields_unit();
        let (quiet, _) = walk(unit, root, FIELDS);
        assert_eq!(verbose.facts(), quiet.facts());

        let dump = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(dump.contains("CompilationUnit line 1"), "{}", dump);
        assert!(dump.contains("  TypeDeclaration line 2"), "{}", dump);
        assert!(dump.contains("    FieldDeclaration line 3"), "{}", dump);
    }
}
