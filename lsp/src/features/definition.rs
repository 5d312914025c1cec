use std::path::{Path, PathBuf};

use meson_core::token::Span;

use super::FileView;
use crate::project::MesonTree;

/// Target of a go-to-definition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub file: PathBuf,
    pub span: Span,
}

/// Where the symbol at a position comes from: the first assignment reaching a
/// variable, or the included build file of a `subdir()` call.
pub fn definition(tree: &MesonTree, file: &Path, line: u32, column: u32) -> Option<Definition> {
    let view = FileView::new(tree, file)?;

    if let Some(identifier) = view.metadata.find_identifier_at(line, column) {
        let origin = tree.find_declaration(file, identifier.node)?;
        return Some(Definition {
            file: origin.file.to_path_buf(),
            span: origin.span,
        });
    }

    let call = view.metadata.find_subdir_call_at(line, column)?;
    let owner = tree.find_subdir_tree(file)?;
    let child = owner.children.iter().find(|c| c.include_call == Some(call.node))?;
    Some(Definition {
        file: child.file.clone(),
        span: Span::default(),
    })
}
