use std::path::Path;

use meson_core::typ::Function;
use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};

use super::{FileView, to_range};
use crate::project::MesonTree;

/// Documentation text for builtin functions (`files`) and methods (`str.split`).
pub trait DocLookup: Send + Sync {
    fn docs(&self, id: &str) -> Option<String>;
}

/// No documentation available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDocs;

impl DocLookup for NoDocs {
    fn docs(&self, _id: &str) -> Option<String> {
        None
    }
}

fn markdown(code: &str, docs: Option<String>) -> HoverContents {
    let mut value = format!("```meson\n{}\n```", code);
    if let Some(docs) = docs {
        value.push_str("\n\n");
        value.push_str(&docs);
    }
    HoverContents::Markup(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

fn signatures(functions: &[&Function]) -> String {
    functions.iter().map(|f| f.to_string()).collect::<Vec<_>>().join("\n")
}

/// Hover text at a position: keyword argument types, call signatures or the
/// inferred types of a variable.
pub fn hover(tree: &MesonTree, file: &Path, line: u32, column: u32, docs: &dyn DocLookup) -> Option<Hover> {
    let view = FileView::new(tree, file)?;
    let metadata = view.metadata;

    if let Some(kwarg) = metadata.find_kwarg_at(line, column)
        && let Some(function) = &kwarg.function
        && let Some(declared) = function.kwarg(&kwarg.name)
    {
        let required = if declared.optional { "" } else { " (required)" };
        return Some(Hover {
            contents: markdown(&format!("{}: {}{}", declared.name, declared.types, required), None),
            range: Some(to_range(kwarg.span)),
        });
    }

    if let Some(call) = metadata.find_function_call_at(line, column)
        && call.name_span.contains(line, column)
    {
        let function = call.function.as_ref()?;
        return Some(Hover {
            contents: markdown(&function.to_string(), docs.docs(&function.id())),
            range: Some(to_range(call.name_span)),
        });
    }

    if let Some(call) = metadata.find_method_call_at(line, column)
        && call.name_span.contains(line, column)
    {
        let first = call.methods.first()?;
        let methods: Vec<&Function> = call.methods.iter().map(|m| m.as_ref()).collect();
        return Some(Hover {
            contents: markdown(&signatures(&methods), docs.docs(&first.id())),
            range: Some(to_range(call.name_span)),
        });
    }

    let identifier = metadata.find_identifier_at(line, column)?;
    let types = if identifier.types.is_empty() {
        "unknown".to_string()
    } else {
        identifier.types.to_string()
    };
    Some(Hover {
        contents: markdown(&format!("{}: {}", identifier.name, types), None),
        range: Some(to_range(identifier.span)),
    })
}
