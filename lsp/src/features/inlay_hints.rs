use std::path::Path;

use meson_core::{
    ast::{Ast, NodeId},
    typ::Function,
};
use tower_lsp::lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, Position, Range};

use super::FileView;
use crate::project::MesonTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlayHintOptions {
    /// `: int|str` after assignment targets.
    pub types: bool,
    /// `name:` before positional arguments.
    pub parameters: bool,
}

impl Default for InlayHintOptions {
    fn default() -> Self {
        Self {
            types: true,
            parameters: true,
        }
    }
}

fn in_range(range: &Range, line: u32) -> bool {
    range.start.line <= line && line <= range.end.line
}

/// Inlay hints for the lines of `range`.
pub fn inlay_hints(tree: &MesonTree, file: &Path, range: Range, options: InlayHintOptions) -> Vec<InlayHint> {
    let Some(view) = FileView::new(tree, file) else {
        return Vec::new();
    };
    let mut hints = Vec::new();

    if options.types {
        for assignment in &view.metadata.assignments {
            if assignment.types.is_empty() || !in_range(&range, assignment.span.end.line) {
                continue;
            }
            hints.push(InlayHint {
                position: Position::new(assignment.span.end.line, assignment.span.end.column),
                label: InlayHintLabel::String(format!(": {}", assignment.types)),
                kind: Some(InlayHintKind::TYPE),
                text_edits: None,
                tooltip: None,
                padding_left: None,
                padding_right: None,
                data: None,
            });
        }
    }

    if options.parameters {
        for call in &view.metadata.calls {
            if let Some(function) = &call.function {
                parameter_hints(view.ast, call.node, function, &range, &mut hints);
            }
        }
        for call in &view.metadata.method_calls {
            // ambiguous receivers may disagree on parameter names
            if let [method] = call.methods.as_slice() {
                parameter_hints(view.ast, call.node, method, &range, &mut hints);
            }
        }
    }

    hints.sort_by_key(|h| (h.position.line, h.position.character));
    hints
}

fn parameter_hints(ast: &Ast, call: NodeId, function: &Function, range: &Range, hints: &mut Vec<InlayHint>) {
    let mut seen_varargs = false;
    for (index, arg) in ast.positional_args(call).into_iter().enumerate() {
        let Some(param) = function.positional_at(index) else {
            break;
        };
        if param.varargs {
            if seen_varargs {
                break;
            }
            seen_varargs = true;
        }
        let span = ast.span(arg);
        if !in_range(range, span.start.line) || ast.identifier(arg) == Some(param.name.as_str()) {
            continue;
        }
        hints.push(InlayHint {
            position: Position::new(span.start.line, span.start.column),
            label: InlayHintLabel::String(format!("{}:", param.name)),
            kind: Some(InlayHintKind::PARAMETER),
            text_edits: None,
            tooltip: None,
            padding_left: None,
            padding_right: Some(true),
            data: None,
        });
    }
}
