use std::path::Path;

use meson_core::{
    token::Span,
    typ::{Binding, Function, Type, TypeNamespace, TypeSet, methods_of},
};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};

use super::FileView;
use crate::project::MesonTree;

const KEYWORDS: &[&str] = &[
    "if",
    "elif",
    "else",
    "endif",
    "foreach",
    "endforeach",
    "break",
    "continue",
    "and",
    "or",
    "not",
    "in",
    "true",
    "false",
];

/// Longest prefix of `line` that is at most `column` UTF-16 units long.
fn utf16_prefix(line: &str, column: u32) -> &str {
    let mut units = 0u32;
    for (i, ch) in line.char_indices() {
        if units >= column {
            return &line[..i];
        }
        units += ch.len_utf16() as u32;
    }
    line
}

fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Completions at a position of `text`, the current buffer of `file`.
///
/// Right after `.` these are the methods of the receiver; anywhere else the
/// remaining keyword arguments of the enclosing call, builtin functions,
/// visible variables and keywords.
pub fn completion(
    tree: &MesonTree,
    ns: &TypeNamespace,
    file: &Path,
    text: &str,
    line: u32,
    column: u32,
) -> Vec<CompletionItem> {
    let Some(line_text) = text.split('\n').nth(line as usize) else {
        return Vec::new();
    };
    let prefix = utf16_prefix(line_text.trim_end_matches('\r'), column);
    let before_word = prefix.trim_end_matches(|c: char| c.is_ascii_alphanumeric() || c == '_');
    let word = &prefix[before_word.len()..];
    let view = FileView::new(tree, file);

    if let Some(receiver) = before_word.strip_suffix('.') {
        let Some(view) = view else {
            return Vec::new();
        };
        let types = receiver_types(&view, line, utf16_len(receiver));
        return method_items(ns, &types, word);
    }

    let mut items = Vec::new();
    if let Some(view) = &view {
        items.extend(kwarg_items(view, line, column, word));
    }
    for function in ns.functions() {
        if function.name.starts_with(word) {
            items.push(CompletionItem {
                label: function.name.clone(),
                kind: Some(CompletionItemKind::FUNCTION),
                detail: Some(function.to_string()),
                ..Default::default()
            });
        }
    }
    if let Some(view) = &view {
        let mut variables: Vec<(&str, String)> = view
            .analysis
            .scope
            .iter()
            .filter(|(name, binding)| name.starts_with(word) && visible_at(binding, file, line, column))
            .map(|(name, binding)| (name, binding.types.to_string()))
            .collect();
        variables.sort();
        for (name, types) in variables {
            items.push(CompletionItem {
                label: name.to_string(),
                kind: Some(CompletionItemKind::VARIABLE),
                detail: Some(types),
                ..Default::default()
            });
        }
    }
    for keyword in KEYWORDS.iter().filter(|k| k.starts_with(word)) {
        items.push(CompletionItem {
            label: keyword.to_string(),
            kind: Some(CompletionItemKind::KEYWORD),
            ..Default::default()
        });
    }
    items
}

/// Whether `binding` is assigned before `(line, column)` of `file`. Bindings
/// from a parent file and builtin globals are visible everywhere.
fn visible_at(binding: &Binding, file: &Path, line: u32, column: u32) -> bool {
    binding.origins.is_empty()
        || binding.origins.iter().any(|origin| {
            &*origin.file != file || (origin.span.start.line, origin.span.start.column) < (line, column)
        })
}

/// Types of the outermost expression ending exactly at `(line, column)`.
fn receiver_types(view: &FileView<'_>, line: u32, column: u32) -> TypeSet {
    let metadata = view.metadata;
    let ends_here = |span: &Span| span.end.line == line && span.end.column == column;
    let mut candidates: Vec<(Span, TypeSet)> = Vec::new();
    candidates.extend(metadata.identifiers.iter().map(|i| (i.span, i.types.clone())));
    candidates.extend(metadata.calls.iter().map(|c| (c.span, c.types.clone())));
    candidates.extend(metadata.method_calls.iter().map(|c| (c.span, c.types.clone())));
    candidates.extend(metadata.strings.iter().map(|s| (s.span, TypeSet::single(Type::Str))));
    candidates
        .into_iter()
        .filter(|(span, _)| ends_here(span))
        .max_by_key(|(span, _)| span.len())
        .map(|(_, types)| types)
        .unwrap_or_default()
}

fn method_items(ns: &TypeNamespace, types: &TypeSet, word: &str) -> Vec<CompletionItem> {
    let mut items: Vec<CompletionItem> = Vec::new();
    for ty in types.iter() {
        for method in methods_of(ns, ty) {
            if !method.name.starts_with(word) || items.iter().any(|i| i.label == method.name) {
                continue;
            }
            items.push(CompletionItem {
                label: method.name.clone(),
                kind: Some(CompletionItemKind::METHOD),
                detail: Some(method.to_string()),
                ..Default::default()
            });
        }
    }
    items
}

/// Keyword arguments of the innermost enclosing call not passed yet.
fn kwarg_items(view: &FileView<'_>, line: u32, column: u32, word: &str) -> Vec<CompletionItem> {
    let metadata = view.metadata;
    let function_call = metadata
        .find_full_function_call_at(line, column)
        .filter(|c| !c.name_span.contains(line, column))
        .and_then(|c| Some((c.node, c.span, c.function.clone()?)));
    let method_call = metadata
        .find_full_method_call_at(line, column)
        .filter(|c| !c.name_span.contains(line, column))
        .and_then(|c| Some((c.node, c.span, c.methods.first()?.clone())));
    let innermost = match (function_call, method_call) {
        (Some(f), Some(m)) => Some(if m.1.len() < f.1.len() { m } else { f }),
        (f, m) => f.or(m),
    };
    let Some((node, _, function)) = innermost else {
        return Vec::new();
    };
    let used: Vec<&str> = view.ast.keyword_args(node).into_iter().map(|(name, _)| name).collect();
    let function: &Function = &function;
    function
        .kwargs()
        .filter(|k| !used.contains(&k.name.as_str()) && k.name.starts_with(word))
        .map(|k| CompletionItem {
            label: k.name.clone(),
            kind: Some(CompletionItemKind::PROPERTY),
            detail: Some(k.types.to_string()),
            insert_text: Some(format!("{}: ", k.name)),
            ..Default::default()
        })
        .collect()
}
