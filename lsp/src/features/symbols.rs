use std::path::Path;

use meson_core::typ::{Type, TypeSet};
use tower_lsp::lsp_types::{DocumentSymbol, SymbolKind};

use super::{FileView, to_range};
use crate::project::MesonTree;

fn symbol_kind(types: &TypeSet) -> SymbolKind {
    if types.len() != 1 {
        return SymbolKind::VARIABLE;
    }
    match types.iter().next() {
        Some(Type::Str) => SymbolKind::STRING,
        Some(Type::Int) => SymbolKind::NUMBER,
        Some(Type::Bool) => SymbolKind::BOOLEAN,
        Some(Type::List(_)) => SymbolKind::ARRAY,
        Some(Type::Dict(_)) => SymbolKind::OBJECT,
        _ => SymbolKind::VARIABLE,
    }
}

/// One symbol per assignment and loop variable, in source order.
pub fn document_symbols(tree: &MesonTree, file: &Path) -> Vec<DocumentSymbol> {
    let Some(view) = FileView::new(tree, file) else {
        return Vec::new();
    };
    view.metadata
        .assignments
        .iter()
        .map(|assignment| DocumentSymbol {
            name: assignment.name.clone(),
            detail: Some(assignment.types.to_string()),
            kind: symbol_kind(&assignment.types),
            tags: None,
            #[allow(deprecated)]
            deprecated: None,
            range: to_range(view.ast.span(assignment.node)),
            selection_range: to_range(assignment.span),
            children: None,
        })
        .collect()
}
