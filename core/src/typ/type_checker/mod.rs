use std::{path::Path, sync::Arc};

use crate::{
    ast::{Ast, NodeId, NodeKind},
    diagnostic::Diagnostic,
    op::AssignOp,
    token::Span,
    typ::{AssignmentRef, FileMetadata, IdentifierRef, Type, TypeNamespace, TypeSet},
    util::{FastHashMap, fast_hash_map_new},
};

mod calls;
mod expressions;
mod scope;

#[cfg(test)]
mod tests;

pub use expressions::{binary_result, format_placeholders};
pub use scope::*;

/// Scope in effect where a `subdir()` call includes another directory.
#[derive(Debug, Clone, PartialEq)]
pub struct SubdirScope {
    pub call: NodeId,
    pub dir: String,
    pub scope: Scope,
}

/// Result of analyzing one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAnalysis {
    pub file: Arc<Path>,
    types: FastHashMap<NodeId, TypeSet>,
    pub metadata: FileMetadata,
    /// Scope snapshots at each literal `subdir()` call, in call order.
    pub subdir_scopes: Vec<SubdirScope>,
    /// Scope at the end of the file.
    pub scope: Scope,
}

impl FileAnalysis {
    /// Inferred types of an expression node. Nodes that were never evaluated
    /// have no entry; an empty set means nothing is known.
    pub fn types_of(&self, id: NodeId) -> Option<&TypeSet> {
        self.types.get(&id)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.metadata.diagnostics
    }
}

/// Infers types for one file's tree against a [`TypeNamespace`].
///
/// The analyzer only reads its inputs: the same tree, namespace and starting
/// scope always produce the same [`FileAnalysis`].
pub struct TypeAnalyzer<'a> {
    ns: &'a TypeNamespace,
    ast: &'a Ast,
    file: Arc<Path>,
    scope: Scope,
    types: FastHashMap<NodeId, TypeSet>,
    meta: FileMetadata,
    subdir_scopes: Vec<SubdirScope>,
}

impl<'a> TypeAnalyzer<'a> {
    pub fn new(ns: &'a TypeNamespace, ast: &'a Ast, file: &Path) -> Self {
        TypeAnalyzer {
            ns,
            ast,
            file: Arc::from(file),
            scope: Scope::new(),
            types: fast_hash_map_new(),
            meta: FileMetadata::default(),
            subdir_scopes: Vec::new(),
        }
    }

    /// Walk the whole file starting from `scope`.
    pub fn analyze(mut self, scope: Scope) -> FileAnalysis {
        self.scope = scope;
        self.meta.diagnostics = self.ast.errors().iter().map(Diagnostic::from).collect();
        let ast = self.ast;
        if let NodeKind::BuildDefinition { statements } = ast.kind(ast.root()) {
            self.block(statements);
        }
        tracing::trace!(
            file = %self.file.display(),
            diagnostics = self.meta.diagnostics.len(),
            calls = self.meta.calls.len(),
            "type analysis finished"
        );
        FileAnalysis {
            file: self.file,
            types: self.types,
            metadata: self.meta,
            subdir_scopes: self.subdir_scopes,
            scope: self.scope,
        }
    }

    fn error(&mut self, message: impl Into<String>, span: Span) {
        self.meta.diagnostics.push(Diagnostic::error(message, span));
    }

    fn warning(&mut self, message: impl Into<String>, span: Span) {
        self.meta.diagnostics.push(Diagnostic::warning(message, span));
    }

    fn origin(&self, node: NodeId) -> Origin {
        Origin {
            file: self.file.clone(),
            node,
            span: self.ast.span(node),
        }
    }

    fn block(&mut self, statements: &[NodeId]) {
        for stmt in statements {
            self.statement(*stmt);
        }
    }

    fn statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::AssignmentStatement { lhs, op, rhs } => self.assignment(id, *lhs, *op, *rhs),
            NodeKind::SelectionStatement { conditions, blocks } => self.selection(conditions, blocks),
            NodeKind::IterationStatement {
                ids,
                expression,
                block,
            } => self.iteration(id, ids, *expression, block),
            NodeKind::BreakNode | NodeKind::ContinueNode | NodeKind::ErrorNode { .. } => {}
            _ => {
                self.expr(id);
            }
        }
    }

    /// Record that `lhs` now holds `types` and index the site.
    fn record_binding(&mut self, node: NodeId, lhs: NodeId, name: &str, types: TypeSet) {
        let span = self.ast.span(lhs);
        let origins = self.scope.get(name).map(|b| b.origins.clone()).unwrap_or_default();
        self.types.insert(lhs, types.clone());
        self.meta.assignments.push(AssignmentRef {
            node,
            lhs,
            span,
            name: name.to_string(),
            types: types.clone(),
        });
        self.meta.identifiers.push(IdentifierRef {
            node: lhs,
            span,
            name: name.to_string(),
            types,
            origins,
        });
    }

    fn assignment(&mut self, node: NodeId, lhs: NodeId, op: AssignOp, rhs: NodeId) {
        let value = self.expr(rhs);
        let ast = self.ast;
        let Some(name) = ast.identifier(lhs) else {
            return;
        };
        let origin = self.origin(lhs);
        let types = match op.binary() {
            None => {
                self.scope.assign(name, value.clone(), Some(origin));
                value
            }
            Some(bin) => {
                let current = match self.scope.get(name) {
                    Some(binding) => binding.types.clone(),
                    None => {
                        self.error(format!("Unknown identifier '{}'", name), origin.span);
                        TypeSet::new()
                    }
                };
                let result = binary_result(bin, &current, &value);
                self.scope.update(name, result.clone(), Some(origin));
                result
            }
        };
        self.record_binding(node, lhs, name, types);
    }

    /// Each branch starts from the scope before the statement; the scopes at
    /// the end of every branch are merged. Without `else` the path that skips
    /// all branches is merged too.
    fn selection(&mut self, conditions: &[NodeId], blocks: &[Vec<NodeId>]) {
        let before = self.scope.clone();
        let mut merged: Option<Scope> = None;
        for (i, block) in blocks.iter().enumerate() {
            self.scope = before.clone();
            if let Some(condition) = conditions.get(i) {
                self.expr(*condition);
            }
            self.block(block);
            match merged.as_mut() {
                Some(scope) => scope.merge(&self.scope),
                None => merged = Some(self.scope.clone()),
            }
        }
        let mut result = merged.unwrap_or_else(|| before.clone());
        if blocks.len() <= conditions.len() {
            result.merge(&before);
        }
        self.scope = result;
    }

    fn loop_variable_types(&mut self, ids: &[NodeId], iterable: &TypeSet, span: Span) -> Vec<TypeSet> {
        if iterable.has_any_like() {
            return vec![TypeSet::any(); ids.len()];
        }
        let has_dict = iterable.iter().any(|t| matches!(t, Type::Dict(_)));
        let has_list = iterable
            .iter()
            .any(|t| matches!(t, Type::List(_)) || matches!(t, Type::Object(o) if &*o.name == "range"));
        match ids.len() {
            1 => {
                if has_dict && !has_list {
                    self.error("Iterating over a dict requires two loop variables", span);
                }
                let mut elements = iterable.list_elements();
                if iterable.objects().any(|o| &*o.name == "range") {
                    elements.insert(Type::Int);
                }
                vec![elements]
            }
            2 => {
                if has_list && !has_dict {
                    self.error("Iterating over a list requires one loop variable", span);
                }
                vec![TypeSet::single(Type::Str), iterable.dict_values()]
            }
            n => vec![TypeSet::new(); n],
        }
    }

    /// The body may run zero times, so the scope before the loop is merged
    /// with the scope after one iteration.
    fn iteration(&mut self, node: NodeId, ids: &[NodeId], expression: NodeId, block: &[NodeId]) {
        let iterable = self.expr(expression);
        let before = self.scope.clone();
        let span = self.ast.span(expression);
        let loop_types = self.loop_variable_types(ids, &iterable, span);
        let ast = self.ast;
        for (id, types) in ids.iter().zip(loop_types) {
            let Some(name) = ast.identifier(*id) else {
                continue;
            };
            let origin = self.origin(*id);
            self.scope.assign(name, types.clone(), Some(origin));
            self.record_binding(node, *id, name, types);
        }
        self.block(block);
        self.scope.merge(&before);
    }
}
