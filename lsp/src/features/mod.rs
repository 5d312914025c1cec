//! Editor features computed from a committed [`MesonTree`].
//!
//! Every entry point takes the tree plus a file path and returns plain
//! `lsp_types` values; a miss is an empty result, never an error.

mod code_actions;
mod completion;
mod definition;
mod folding;
mod formatting;
mod highlight;
mod hover;
mod inlay_hints;
mod semantic_tokens;
mod symbols;

#[cfg(test)]
mod tests;

use std::path::Path;

use meson_core::{
    ast::{Ast, NodeId, NodeKind},
    token::Span,
    typ::{FileAnalysis, FileMetadata},
};
use tower_lsp::lsp_types::{Position, Range};

pub use code_actions::code_actions;
pub use completion::completion;
pub use definition::{Definition, definition};
pub use folding::folding_ranges;
pub use formatting::{ExternalFormatter, Formatter, format_document};
pub use highlight::document_highlights;
pub use hover::{DocLookup, NoDocs, hover};
pub use inlay_hints::{InlayHintOptions, inlay_hints};
pub use semantic_tokens::{legend as semantic_tokens_legend, semantic_tokens};
pub use symbols::document_symbols;

use crate::project::MesonTree;

/// Everything known about one analyzed file.
pub struct FileView<'a> {
    pub ast: &'a Ast,
    pub analysis: &'a FileAnalysis,
    pub metadata: &'a FileMetadata,
}

impl<'a> FileView<'a> {
    pub fn new(tree: &'a MesonTree, file: &Path) -> Option<Self> {
        let subdir = tree.find_subdir_tree(file)?;
        Some(FileView {
            ast: subdir.ast.as_deref()?,
            analysis: subdir.analysis()?,
            metadata: tree.metadata_for(&subdir.file)?,
        })
    }
}

pub fn to_range(span: Span) -> Range {
    Range::new(
        Position::new(span.start.line, span.start.column),
        Position::new(span.end.line, span.end.column),
    )
}

/// True for an `IdExpression` that names a variable, as opposed to a callee,
/// a method name or a keyword argument key.
pub fn is_variable(ast: &Ast, id: NodeId) -> bool {
    if !matches!(ast.kind(id), NodeKind::IdExpression { .. }) {
        return false;
    }
    match ast.parent(id).map(|p| ast.kind(p)) {
        Some(NodeKind::FunctionExpression { id: callee, .. }) => *callee != id,
        Some(NodeKind::MethodExpression { id: member, .. }) => *member != id,
        Some(NodeKind::KeywordItem { key, .. }) => *key != id,
        _ => true,
    }
}

/// True for an identifier that receives a value: an assignment target or a
/// loop variable.
pub fn is_binding_site(ast: &Ast, id: NodeId) -> bool {
    match ast.parent(id).map(|p| ast.kind(p)) {
        Some(NodeKind::AssignmentStatement { lhs, .. }) => *lhs == id,
        Some(NodeKind::IterationStatement { ids, .. }) => ids.contains(&id),
        _ => false,
    }
}
