use std::path::Path;

use meson_core::ast::{Ast, NodeId, NodeKind, Visitor, Walk};
use tower_lsp::lsp_types::{FoldingRange, FoldingRangeKind};

use crate::project::MesonTree;

#[derive(Default)]
struct Folds(Vec<FoldingRange>);

impl Folds {
    /// Fold up to the line before the node's last line, which keeps
    /// `endif`/`endforeach` and closing brackets visible.
    fn add(&mut self, ast: &Ast, id: NodeId) {
        let span = ast.span(id);
        if span.end.line <= span.start.line + 1 {
            return;
        }
        self.0.push(FoldingRange {
            start_line: span.start.line,
            start_character: None,
            end_line: span.end.line - 1,
            end_character: None,
            kind: Some(FoldingRangeKind::Region),
            collapsed_text: None,
        });
    }
}

impl Visitor for Folds {
    fn visit_selection_statement(&mut self, ast: &Ast, id: NodeId) -> Walk {
        // one region per branch so `elif`/`else` stay visible
        if let NodeKind::SelectionStatement { blocks, .. } = ast.kind(id) {
            let span = ast.span(id);
            let mut starts: Vec<u32> = vec![span.start.line];
            for block in blocks.iter().skip(1) {
                if let Some(first) = block.first() {
                    starts.push(ast.span(*first).start.line.saturating_sub(1));
                }
            }
            starts.push(span.end.line);
            for pair in starts.windows(2) {
                if pair[1] > pair[0] + 1 {
                    self.0.push(FoldingRange {
                        start_line: pair[0],
                        start_character: None,
                        end_line: pair[1] - 1,
                        end_character: None,
                        kind: Some(FoldingRangeKind::Region),
                        collapsed_text: None,
                    });
                }
            }
        }
        Walk::Continue
    }

    fn visit_iteration_statement(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.add(ast, id);
        Walk::Continue
    }

    fn visit_array_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.add(ast, id);
        Walk::Continue
    }

    fn visit_dictionary_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.add(ast, id);
        Walk::Continue
    }

    fn visit_argument_list(&mut self, ast: &Ast, id: NodeId) -> Walk {
        self.add(ast, id);
        Walk::Continue
    }
}

/// Foldable regions: conditional branches, loops and multi-line brackets.
pub fn folding_ranges(tree: &MesonTree, file: &Path) -> Vec<FoldingRange> {
    let Some(ast) = tree.ast_for(file) else {
        return Vec::new();
    };
    let mut folds = Folds::default();
    ast.walk(&mut folds);
    folds.0.sort_by_key(|f| (f.start_line, f.end_line));
    folds.0
}
