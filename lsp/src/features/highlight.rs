use std::path::Path;

use meson_core::ast::{Ast, NodeId, NodeKind, Visitor, Walk};
use tower_lsp::lsp_types::{DocumentHighlight, DocumentHighlightKind};

use super::{is_binding_site, is_variable, to_range};
use crate::project::MesonTree;

struct SameName<'a> {
    name: &'a str,
    found: Vec<DocumentHighlight>,
}

impl Visitor for SameName<'_> {
    fn visit_id_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        if ast.identifier(id) == Some(self.name) && is_variable(ast, id) {
            let kind = if is_binding_site(ast, id) {
                DocumentHighlightKind::WRITE
            } else {
                DocumentHighlightKind::READ
            };
            self.found.push(DocumentHighlight {
                range: to_range(ast.span(id)),
                kind: Some(kind),
            });
        }
        Walk::Continue
    }
}

/// Every use of the variable under the cursor in the same file.
pub fn document_highlights(tree: &MesonTree, file: &Path, line: u32, column: u32) -> Vec<DocumentHighlight> {
    let Some(ast) = tree.ast_for(file) else {
        return Vec::new();
    };
    let Some(id) = ast.node_at(line, column) else {
        return Vec::new();
    };
    let NodeKind::IdExpression { name } = ast.kind(id) else {
        return Vec::new();
    };
    if !is_variable(ast, id) {
        return Vec::new();
    }
    let mut visitor = SameName {
        name,
        found: Vec::new(),
    };
    ast.walk(&mut visitor);
    visitor.found
}
