use std::{collections::HashMap, path::Path};

use meson_core::{
    ast::{Ast, NodeId, NodeKind, Visitor, Walk},
    op::AssignOp,
    typ::Scope,
};
use tower_lsp::lsp_types::{CodeAction, CodeActionKind, Position, Range, TextEdit, Url, WorkspaceEdit};

use super::{FileView, to_range};
use crate::project::MesonTree;

const LIBRARY_FUNCTIONS: &[&str] = &["library", "static_library", "shared_library", "both_libraries"];

struct Actions<'a> {
    uri: &'a Url,
    line: u32,
    column: u32,
    scope: &'a Scope,
    actions: Vec<CodeAction>,
}

impl Actions<'_> {
    fn touches(&self, ast: &Ast, id: NodeId) -> bool {
        ast.span(id).contains(self.line, self.column)
    }

    fn push(&mut self, title: String, edit: TextEdit) {
        let mut changes = HashMap::new();
        changes.insert(self.uri.clone(), vec![edit]);
        self.actions.push(CodeAction {
            title,
            kind: Some(CodeActionKind::REFACTOR_REWRITE),
            edit: Some(WorkspaceEdit {
                changes: Some(changes),
                ..Default::default()
            }),
            ..Default::default()
        });
    }

    fn rename_callee(&mut self, ast: &Ast, callee: NodeId, to: &str, title: &str) {
        self.push(
            title.to_string(),
            TextEdit {
                range: to_range(ast.span(callee)),
                new_text: to.to_string(),
            },
        );
    }

    /// `lib = library(...)` gains a following `lib_dep = declare_dependency(...)`.
    fn declare_dependency(&mut self, ast: &Ast, call: NodeId) {
        let Some(statement) = ast.parent(call) else {
            return;
        };
        let NodeKind::AssignmentStatement {
            lhs,
            op: AssignOp::Assign,
            rhs,
        } = ast.kind(statement)
        else {
            return;
        };
        let Some(name) = ast.identifier(*lhs).filter(|_| *rhs == call) else {
            return;
        };
        let mut args = format!("link_with: {}", name);
        for (key, item) in ast.keyword_args(call) {
            if key == "include_directories"
                && let NodeKind::KeywordItem { value, .. } = ast.kind(item)
            {
                args.push_str(&format!(", include_directories: {}", ast.text(*value)));
            }
        }
        let end = ast.span(statement).end;
        let at = Position::new(end.line, end.column);
        self.push(
            format!("Declare dependency '{}_dep'", name),
            TextEdit {
                range: Range::new(at, at),
                new_text: format!("\n{}_dep = declare_dependency({})", name, args),
            },
        );
    }

    /// `configure_file(input: i, output: o, copy: true)` is `fs.copyfile(i, o)`.
    fn copyfile(&mut self, ast: &Ast, call: NodeId) {
        if !ast.positional_args(call).is_empty() {
            return;
        }
        let kwargs = ast.keyword_args(call);
        if kwargs.len() != 3 {
            return;
        }
        let value = |name: &str| {
            kwargs
                .iter()
                .find(|(key, _)| *key == name)
                .and_then(|(_, item)| match ast.kind(*item) {
                    NodeKind::KeywordItem { value, .. } => Some(*value),
                    _ => None,
                })
        };
        let (Some(input), Some(output), Some(copy)) = (value("input"), value("output"), value("copy")) else {
            return;
        };
        if !matches!(ast.kind(copy), NodeKind::BooleanLiteral { value: true }) {
            return;
        }
        let module = self.fs_module_variable().unwrap_or_else(|| "import('fs')".to_string());
        self.push(
            "Use fs.copyfile()".to_string(),
            TextEdit {
                range: to_range(ast.span(call)),
                new_text: format!("{}.copyfile({}, {})", module, ast.text(input), ast.text(output)),
            },
        );
    }

    /// Variable holding the `fs` module, if the file imports it.
    fn fs_module_variable(&self) -> Option<String> {
        self.scope
            .iter()
            .filter(|(_, binding)| binding.types.objects().any(|o| &*o.name == "fs_module"))
            .map(|(name, _)| name)
            .min()
            .map(str::to_string)
    }
}

impl Visitor for Actions<'_> {
    fn visit_integer_literal(&mut self, ast: &Ast, id: NodeId) -> Walk {
        if !self.touches(ast, id) {
            return Walk::Continue;
        }
        let NodeKind::IntegerLiteral { value, raw } = ast.kind(id) else {
            return Walk::Continue;
        };
        let raw = raw.to_ascii_lowercase();
        let base = if raw.starts_with("0x") {
            16
        } else if raw.starts_with("0o") {
            8
        } else if raw.starts_with("0b") {
            2
        } else {
            10
        };
        let conversions = [
            (16, "hexadecimal", format!("{:#x}", value)),
            (8, "octal", format!("{:#o}", value)),
            (2, "binary", format!("{:#b}", value)),
            (10, "decimal", value.to_string()),
        ];
        for (target, name, text) in conversions {
            if target != base {
                self.push(
                    format!("Convert to {} literal", name),
                    TextEdit {
                        range: to_range(ast.span(id)),
                        new_text: text,
                    },
                );
            }
        }
        Walk::Continue
    }

    fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
        if !self.touches(ast, id) {
            return Walk::Continue;
        }
        let (NodeKind::FunctionExpression { id: callee, .. }, Some(name)) = (ast.kind(id), ast.call_name(id)) else {
            return Walk::Continue;
        };
        if matches!(name, "static_library" | "shared_library") {
            self.rename_callee(ast, *callee, "library", "Use generic library()");
        }
        match name {
            "shared_library" => self.rename_callee(ast, *callee, "shared_module", "Convert to shared_module()"),
            "shared_module" => self.rename_callee(ast, *callee, "shared_library", "Convert to shared_library()"),
            "configure_file" => self.copyfile(ast, id),
            _ => {}
        }
        if LIBRARY_FUNCTIONS.contains(&name) {
            self.declare_dependency(ast, id);
        }
        Walk::Continue
    }
}

/// Rewrites offered for the nodes under the start of `range`.
pub fn code_actions(tree: &MesonTree, file: &Path, uri: &Url, range: Range) -> Vec<CodeAction> {
    let Some(view) = FileView::new(tree, file) else {
        return Vec::new();
    };
    let mut actions = Actions {
        uri,
        line: range.start.line,
        column: range.start.character,
        scope: &view.analysis.scope,
        actions: Vec::new(),
    };
    view.ast.walk(&mut actions);
    actions.actions
}
