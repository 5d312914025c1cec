use std::path::{Path, PathBuf};

use anyhow::Result;
use meson_core::typ::TypeNamespace;
use tower_lsp::lsp_types::{
    CompletionItemKind, DocumentHighlightKind, HoverContents, InlayHintLabel, Position, Range, SemanticToken,
    SymbolKind, Url,
};

use super::*;
use crate::project::{AstCache, FileSource, MesonTree};

const ROOT: &str = "/project/meson.build";

fn build(files: &[(&str, &str)]) -> MesonTree {
    let source = FileSource::new();
    for (rel, text) in files {
        source.set_override(Path::new("/project").join(rel), text.to_string());
    }
    let ns = meson_stdlib::namespace().unwrap();
    MesonTree::new(Path::new("/project"), &source, &AstCache::new(), &ns).unwrap()
}

fn single(text: &str) -> MesonTree {
    build(&[("meson.build", text)])
}

fn ns() -> std::sync::Arc<TypeNamespace> {
    meson_stdlib::namespace().unwrap()
}

fn hover_text(tree: &MesonTree, line: u32, column: u32, docs: &dyn DocLookup) -> Option<String> {
    match hover(tree, Path::new(ROOT), line, column, docs)?.contents {
        HoverContents::Markup(markup) => Some(markup.value),
        _ => None,
    }
}

fn labels(items: &[tower_lsp::lsp_types::CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

struct FixedDocs;

impl DocLookup for FixedDocs {
    fn docs(&self, id: &str) -> Option<String> {
        (id == "files").then(|| "Turns paths into file objects.".to_string())
    }
}

#[test]
fn test_hover_variable_types() {
    let tree = single("x = 'a'\nif true\n  x = 1\nendif\n");
    assert_eq!(hover_text(&tree, 0, 0, &NoDocs).unwrap(), "```meson\nx: str\n```");
    assert!(hover_text(&tree, 0, 2, &NoDocs).is_none());
}

#[test]
fn test_hover_calls_and_kwargs() {
    let tree = single("files('a.c')\ny = 'a'.split()\nexecutable('e', 'a.c', install: true)\n");
    let function = hover_text(&tree, 0, 1, &NoDocs).unwrap();
    assert!(function.contains("list(file) files(file...: str|file)"), "{}", function);

    let method = hover_text(&tree, 1, 9, &NoDocs).unwrap();
    assert!(method.contains("str.split("), "{}", method);

    let kwarg = hover_text(&tree, 2, 24, &NoDocs).unwrap();
    assert!(kwarg.contains("install: bool"), "{}", kwarg);
}

#[test]
fn test_hover_includes_docs() {
    let tree = single("files('a.c')\n");
    let text = hover_text(&tree, 0, 2, &FixedDocs).unwrap();
    assert!(text.ends_with("\n\nTurns paths into file objects."));
}

#[test]
fn test_method_completion_after_dot() {
    // the committed tree predates the dot the user just typed
    let tree = single("s = 'abc'\nt = s.strip()\n");
    let items = completion(&tree, &ns(), Path::new(ROOT), "s = 'abc'\nt = s.\n", 1, 6);
    let names = labels(&items);
    assert!(names.contains(&"split"));
    assert!(names.contains(&"to_upper"));
    assert!(!names.contains(&"length"));
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::METHOD)));

    let filtered = completion(&tree, &ns(), Path::new(ROOT), "s = 'abc'\nt = s.to_\n", 1, 9);
    let mut names = labels(&filtered);
    names.sort();
    assert_eq!(names, vec!["to_int", "to_lower", "to_upper"]);
}

#[test]
fn test_method_completion_follows_inheritance() {
    let tree = single("e = executable('e', 'a.c')\nx = e.name()\n");
    let items = completion(&tree, &ns(), Path::new(ROOT), "e = executable('e', 'a.c')\nx = e.\n", 1, 6);
    let names = labels(&items);
    assert!(names.contains(&"full_path"));
    assert!(names.contains(&"extract_objects"));
}

#[test]
fn test_identifier_completion() {
    let text = "foo = 1\nfood = 'x'\nfo";
    let tree = single("foo = 1\nfood = 'x'\n");
    let items = completion(&tree, &ns(), Path::new(ROOT), text, 2, 2);
    let names = labels(&items);
    assert!(names.contains(&"foo"));
    assert!(names.contains(&"food"));
    assert!(names.contains(&"foreach"));
    assert!(!names.contains(&"files"));

    let all = completion(&tree, &ns(), Path::new(ROOT), "foo = 1\nfood = 'x'\n\n", 2, 0);
    let names = labels(&all);
    assert!(names.contains(&"executable"));
    assert!(names.contains(&"meson"));
}

#[test]
fn test_completion_skips_variables_assigned_later() {
    let text = "early = 1\n\nlate = 2\nif true\n  branch = 3\nendif\n";
    let tree = build(&[("meson.build", "inherited = 0\nsubdir('sub')\n"), ("sub/meson.build", text)]);
    let sub = Path::new("/project/sub/meson.build");

    let items = completion(&tree, &ns(), sub, text, 1, 0);
    let names = labels(&items);
    assert!(names.contains(&"early"));
    assert!(names.contains(&"inherited"));
    assert!(names.contains(&"meson"));
    assert!(!names.contains(&"late"));
    assert!(!names.contains(&"branch"));

    let items = completion(&tree, &ns(), sub, text, 6, 0);
    let names = labels(&items);
    assert!(names.contains(&"late"));
    assert!(names.contains(&"branch"));
}

#[test]
fn test_kwarg_completion_skips_given_kwargs() {
    let text = "executable('e', 'a.c', install: true)\n";
    let tree = single(text);
    let items = completion(&tree, &ns(), Path::new(ROOT), text, 0, 16);
    let kwargs: Vec<&str> = items
        .iter()
        .filter(|i| i.kind == Some(CompletionItemKind::PROPERTY))
        .map(|i| i.label.as_str())
        .collect();
    assert!(kwargs.contains(&"link_with"));
    assert!(!kwargs.contains(&"install"));
    let link_with = items.iter().find(|i| i.label == "link_with").unwrap();
    assert_eq!(link_with.insert_text.as_deref(), Some("link_with: "));
}

#[test]
fn test_definition_across_files() {
    let tree = build(&[("meson.build", "x = 1\nsubdir('a')\n"), ("a/meson.build", "y = x\n")]);
    let target = definition(&tree, Path::new("/project/a/meson.build"), 0, 4).unwrap();
    assert_eq!(target.file, PathBuf::from(ROOT));
    assert_eq!((target.span.start.line, target.span.start.column), (0, 0));

    let subdir = definition(&tree, Path::new(ROOT), 1, 2).unwrap();
    assert_eq!(subdir.file, PathBuf::from("/project/a/meson.build"));

    assert!(definition(&tree, Path::new(ROOT), 0, 2).is_none());
}

#[test]
fn test_document_symbols() {
    let tree = single("x = 1\ny = 'a'\nz = [1]\nforeach i : z\nendforeach\n");
    let symbols = document_symbols(&tree, Path::new(ROOT));
    let summary: Vec<(&str, SymbolKind)> = symbols.iter().map(|s| (s.name.as_str(), s.kind)).collect();
    assert_eq!(
        summary,
        vec![
            ("x", SymbolKind::NUMBER),
            ("y", SymbolKind::STRING),
            ("z", SymbolKind::ARRAY),
            ("i", SymbolKind::NUMBER),
        ]
    );
    assert_eq!(symbols[1].detail.as_deref(), Some("str"));
}

#[test]
fn test_document_highlights() {
    let tree = single("x = 1\ny = x + x\nmessage(x)\n");
    let highlights = document_highlights(&tree, Path::new(ROOT), 1, 4);
    assert_eq!(highlights.len(), 4);
    assert_eq!(highlights[0].kind, Some(DocumentHighlightKind::WRITE));
    assert!(highlights[1..].iter().all(|h| h.kind == Some(DocumentHighlightKind::READ)));

    assert!(document_highlights(&tree, Path::new(ROOT), 2, 1).is_empty());
}

#[test]
fn test_semantic_tokens() {
    let tree = single("x = 'a'\nif true\n  message(x)\nendif\n");
    let tokens = semantic_tokens(&tree, Path::new(ROOT));
    let token = |delta_line, delta_start, length, token_type, token_modifiers_bitset| SemanticToken {
        delta_line,
        delta_start,
        length,
        token_type,
        token_modifiers_bitset,
    };
    assert_eq!(
        tokens,
        vec![
            token(0, 0, 1, 2, 1),
            token(0, 4, 3, 4, 0),
            token(1, 0, 2, 6, 0),
            token(0, 3, 4, 6, 0),
            token(1, 2, 7, 0, 0),
            token(0, 8, 1, 2, 0),
            token(1, 0, 5, 6, 0),
        ]
    );
    assert_eq!(semantic_tokens_legend().token_types.len(), 7);
}

#[test]
fn test_inlay_hints() {
    let tree = single("x = 1\nfiles('a.c', 'b.c')\n");
    let everything = Range::new(Position::new(0, 0), Position::new(10, 0));
    let hints = inlay_hints(&tree, Path::new(ROOT), everything, InlayHintOptions::default());
    let labels: Vec<(u32, u32, String)> = hints
        .iter()
        .map(|h| match &h.label {
            InlayHintLabel::String(s) => (h.position.line, h.position.character, s.clone()),
            InlayHintLabel::LabelParts(_) => unreachable!(),
        })
        .collect();
    assert_eq!(
        labels,
        vec![(0, 1, ": int".to_string()), (1, 6, "file:".to_string())]
    );

    let only_params = inlay_hints(
        &tree,
        Path::new(ROOT),
        everything,
        InlayHintOptions {
            types: false,
            parameters: true,
        },
    );
    assert_eq!(only_params.len(), 1);

    let first_line = Range::new(Position::new(0, 0), Position::new(0, 5));
    assert_eq!(inlay_hints(&tree, Path::new(ROOT), first_line, InlayHintOptions::default()).len(), 1);
}

fn action_edits(actions: &[tower_lsp::lsp_types::CodeAction]) -> Vec<(String, String)> {
    actions
        .iter()
        .map(|a| {
            let changes = a.edit.as_ref().and_then(|e| e.changes.as_ref()).unwrap();
            let edits = changes.values().next().unwrap();
            (a.title.clone(), edits[0].new_text.clone())
        })
        .collect()
}

fn uri() -> Url {
    Url::parse("file:///project/meson.build").unwrap()
}

#[test]
fn test_integer_conversions() {
    let tree = single("x = 0x1F\n");
    let cursor = Range::new(Position::new(0, 5), Position::new(0, 5));
    let actions = action_edits(&code_actions(&tree, Path::new(ROOT), &uri(), cursor));
    assert_eq!(
        actions,
        vec![
            ("Convert to octal literal".to_string(), "0o37".to_string()),
            ("Convert to binary literal".to_string(), "0b11111".to_string()),
            ("Convert to decimal literal".to_string(), "31".to_string()),
        ]
    );
}

#[test]
fn test_library_actions() {
    let tree = single("lib = shared_library('a', 'a.c', include_directories: inc)\n");
    let cursor = Range::new(Position::new(0, 8), Position::new(0, 8));
    let actions = action_edits(&code_actions(&tree, Path::new(ROOT), &uri(), cursor));
    assert_eq!(
        actions,
        vec![
            ("Use generic library()".to_string(), "library".to_string()),
            ("Convert to shared_module()".to_string(), "shared_module".to_string()),
            (
                "Declare dependency 'lib_dep'".to_string(),
                "\nlib_dep = declare_dependency(link_with: lib, include_directories: inc)".to_string()
            ),
        ]
    );

    let module = single("m = shared_module('a', 'a.c')\n");
    let actions = action_edits(&code_actions(&module, Path::new(ROOT), &uri(), cursor));
    assert_eq!(
        actions,
        vec![("Convert to shared_library()".to_string(), "shared_library".to_string())]
    );
}

#[test]
fn test_configure_file_copy_action() {
    let tree = single("fs = import('fs')\nconfigure_file(input: 'a.in', output: 'a', copy: true)\n");
    let cursor = Range::new(Position::new(1, 2), Position::new(1, 2));
    let actions = action_edits(&code_actions(&tree, Path::new(ROOT), &uri(), cursor));
    assert_eq!(
        actions,
        vec![("Use fs.copyfile()".to_string(), "fs.copyfile('a.in', 'a')".to_string())]
    );

    let plain = single("configure_file(input: 'a.in', output: 'a', copy: true)\n");
    let cursor = Range::new(Position::new(0, 2), Position::new(0, 2));
    let actions = action_edits(&code_actions(&plain, Path::new(ROOT), &uri(), cursor));
    assert_eq!(actions[0].1, "import('fs').copyfile('a.in', 'a')");

    let not_copy = single("configure_file(input: 'a.in', output: 'a', configuration: {})\n");
    assert!(code_actions(&not_copy, Path::new(ROOT), &uri(), cursor).is_empty());
}

#[test]
fn test_folding_ranges() {
    let tree = single("if a\n  x = 1\nelse\n  x = 2\nendif\nforeach i : [1]\n  y = i\nendforeach\n");
    let folds: Vec<(u32, u32)> = folding_ranges(&tree, Path::new(ROOT))
        .iter()
        .map(|f| (f.start_line, f.end_line))
        .collect();
    assert_eq!(folds, vec![(0, 1), (2, 3), (5, 6)]);
}

#[test]
fn test_queries_on_unknown_file_are_empty() {
    let tree = single("x = 1\n");
    let other = Path::new("/elsewhere/meson.build");
    assert!(hover(&tree, other, 0, 0, &NoDocs).is_none());
    assert!(document_symbols(&tree, other).is_empty());
    assert!(semantic_tokens(&tree, other).is_empty());
    assert!(folding_ranges(&tree, other).is_empty());
}

struct Shouting;

#[tower_lsp::async_trait]
impl Formatter for Shouting {
    async fn format(&self, text: &str) -> Result<String> {
        Ok(text.to_uppercase())
    }
}

#[tokio::test]
async fn test_format_document_replaces_everything() -> Result<()> {
    let edits = format_document(&Shouting, "x = 'a'\ny = 'é'").await?.unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].range, Range::new(Position::new(0, 0), Position::new(1, 7)));
    assert_eq!(edits[0].new_text, "X = 'A'\nY = 'É'");

    assert!(format_document(&Shouting, "X = 1\n").await?.is_none());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_external_formatter() -> Result<()> {
    let cat = ExternalFormatter {
        command: "cat".to_string(),
        args: Vec::new(),
    };
    assert_eq!(cat.format("x = 1\n").await?, "x = 1\n");

    let missing = ExternalFormatter {
        command: "definitely-not-a-formatter".to_string(),
        args: Vec::new(),
    };
    let err = missing.format("x = 1\n").await.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to start formatter"));
    Ok(())
}
