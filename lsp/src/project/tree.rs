use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use meson_core::{
    ast::{Ast, NodeId, Visitor, Walk},
    diagnostic::Diagnostic,
    token::Span,
    typ::{FileAnalysis, FileMetadata, MesonMetadata, Origin, Scope, TypeAnalyzer, TypeNamespace},
    util::{FastHashSet, fast_hash_set_new},
};
use tracing::{debug, trace, warn};

use super::{AstCache, FileSource};

pub const BUILD_FILE: &str = "meson.build";

/// One `meson.build` file and the directories it includes.
#[derive(Debug)]
pub struct SubdirTree {
    pub dir: PathBuf,
    pub file: PathBuf,
    /// Absent when the file exists but could not be read.
    pub ast: Option<Arc<Ast>>,
    /// `subdir()` call in the parent file that included this directory.
    pub include_call: Option<NodeId>,
    /// Included directories in call order.
    pub children: Vec<SubdirTree>,
    include_diagnostics: Vec<Diagnostic>,
    analysis: Option<FileAnalysis>,
}

impl SubdirTree {
    pub fn analysis(&self) -> Option<&FileAnalysis> {
        self.analysis.as_ref()
    }

    /// This tree and every tree below it, parents before children.
    pub fn walk(&self) -> Vec<&SubdirTree> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a SubdirTree>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }
}

/// Every build file of a project, joined by `subdir()` calls.
#[derive(Debug)]
pub struct MesonTree {
    root_dir: PathBuf,
    root: SubdirTree,
    metadata: MesonMetadata,
    analyzed: bool,
}

impl MesonTree {
    /// Parse and analyze the project rooted at `root_dir`.
    ///
    /// Fails only when the root build file cannot be read; every other
    /// problem becomes a diagnostic.
    pub fn new(root_dir: &Path, source: &FileSource, cache: &AstCache, ns: &TypeNamespace) -> Result<MesonTree> {
        let mut tree = Self::parse_all(root_dir, source, cache)?;
        tree.analyze_all(ns);
        Ok(tree)
    }

    /// Parse the root file and, recursively, every directory it includes with
    /// a literal `subdir()` argument.
    pub fn parse_all(root_dir: &Path, source: &FileSource, cache: &AstCache) -> Result<MesonTree> {
        let started = Instant::now();
        let root_dir = normalize(root_dir);
        let file = root_dir.join(BUILD_FILE);
        let text = source
            .read(&file)
            .with_context(|| format!("No readable {} in '{}'", BUILD_FILE, root_dir.display()))?;

        let mut builder = TreeBuilder {
            source,
            cache,
            stack: Vec::new(),
            included: fast_hash_set_new(),
        };
        let root = builder.build(root_dir.clone(), file, Some(text), None);
        debug!(
            root = %root_dir.display(),
            files = builder.included.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parsed project"
        );
        Ok(MesonTree {
            root_dir,
            root,
            metadata: MesonMetadata::new(),
            analyzed: false,
        })
    }

    /// Analyze every file in inclusion order. A child starts from the scope
    /// its parent had at the `subdir()` call; nothing flows back up.
    pub fn analyze_all(&mut self, ns: &TypeNamespace) {
        let started = Instant::now();
        let mut metadata = MesonMetadata::new();
        analyze_tree(&mut self.root, ns, Scope::root(ns), &mut metadata);
        self.metadata = metadata;
        self.analyzed = true;
        debug!(
            root = %self.root_dir.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analyzed project"
        );
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn root(&self) -> &SubdirTree {
        &self.root
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    pub fn metadata(&self) -> &MesonMetadata {
        &self.metadata
    }

    pub fn metadata_for(&self, path: &Path) -> Option<&FileMetadata> {
        self.metadata.file(&normalize(path))
    }

    /// Every build file of the project, parents before children.
    pub fn all_files(&self) -> Vec<PathBuf> {
        self.root.walk().into_iter().map(|t| t.file.clone()).collect()
    }

    /// Tree owning `path`, which may name the build file or its directory.
    pub fn find_subdir_tree(&self, path: &Path) -> Option<&SubdirTree> {
        let path = normalize(path);
        self.root.walk().into_iter().find(|t| t.file == path || t.dir == path)
    }

    pub fn ast_for(&self, path: &Path) -> Option<&Arc<Ast>> {
        self.find_subdir_tree(path)?.ast.as_ref()
    }

    pub fn analysis_for(&self, path: &Path) -> Option<&FileAnalysis> {
        self.find_subdir_tree(path)?.analysis()
    }

    /// Every assignment that reaches the identifier `node` of `file`, possibly
    /// in an ancestor file. An assignment target is its own declaration.
    pub fn find_declarations(&self, file: &Path, node: NodeId) -> Vec<Origin> {
        let file = normalize(file);
        let Some(metadata) = self.metadata.file(&file) else {
            return Vec::new();
        };
        if let Some(identifier) = metadata.identifiers.iter().find(|i| i.node == node) {
            return identifier.origins.clone();
        }
        metadata
            .assignments
            .iter()
            .find(|a| a.lhs == node)
            .map(|a| {
                vec![Origin {
                    file: Arc::from(file.as_path()),
                    node: a.lhs,
                    span: a.span,
                }]
            })
            .unwrap_or_default()
    }

    /// First reaching assignment of the identifier `node`.
    pub fn find_declaration(&self, file: &Path, node: NodeId) -> Option<Origin> {
        self.find_declarations(file, node).into_iter().next()
    }

    /// Diagnostics of every file in the tree, including files with none.
    pub fn diagnostics(&self) -> Vec<(PathBuf, Vec<Diagnostic>)> {
        self.root
            .walk()
            .into_iter()
            .map(|tree| (tree.file.clone(), self.file_diagnostics(tree)))
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics()
            .iter()
            .map(|(_, d)| d.iter().filter(|d| d.is_error()).count())
            .sum()
    }

    fn file_diagnostics(&self, tree: &SubdirTree) -> Vec<Diagnostic> {
        if let Some(metadata) = self.metadata.file(&tree.file) {
            return metadata.diagnostics.clone();
        }
        // parsed but not analyzed yet
        let mut diagnostics: Vec<Diagnostic> = tree
            .ast
            .iter()
            .flat_map(|ast| ast.errors().iter().map(Diagnostic::from))
            .collect();
        diagnostics.extend(tree.include_diagnostics.iter().cloned());
        diagnostics
    }
}

struct TreeBuilder<'a> {
    source: &'a FileSource,
    cache: &'a AstCache,
    /// Build files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    included: FastHashSet<PathBuf>,
}

impl TreeBuilder<'_> {
    fn build(&mut self, dir: PathBuf, file: PathBuf, text: Option<String>, call: Option<NodeId>) -> SubdirTree {
        let ast = text.map(|text| self.cache.get_or_parse(&file, &text, self.source.is_open(&file)));
        let mut tree = SubdirTree {
            dir,
            file,
            ast: ast.clone(),
            include_call: call,
            children: Vec::new(),
            include_diagnostics: Vec::new(),
            analysis: None,
        };
        self.included.insert(tree.file.clone());
        let Some(ast) = ast else {
            return tree;
        };

        self.stack.push(tree.file.clone());
        for include in literal_subdir_calls(&ast) {
            let child_dir = normalize(&tree.dir.join(&include.dir));
            let child_file = child_dir.join(BUILD_FILE);
            if self.stack.contains(&child_file) {
                trace!(file = %child_file.display(), "recursive subdir() skipped");
                tree.include_diagnostics.push(Diagnostic::error(
                    format!("Recursive inclusion of directory '{}'", include.dir),
                    include.span,
                ));
                continue;
            }
            if self.included.contains(&child_file) {
                tree.include_diagnostics.push(Diagnostic::error(
                    format!("Directory '{}' is already included", include.dir),
                    include.span,
                ));
                continue;
            }
            if !self.source.exists(&child_file) {
                tree.include_diagnostics.push(Diagnostic::error(
                    format!("Directory '{}' does not contain a {}", include.dir, BUILD_FILE),
                    include.span,
                ));
                continue;
            }
            let text = match self.source.read(&child_file) {
                Ok(text) => Some(text),
                Err(err) => {
                    warn!("{:#}", err);
                    tree.include_diagnostics.push(Diagnostic::error(
                        format!("Cannot read {} of directory '{}'", BUILD_FILE, include.dir),
                        include.span,
                    ));
                    None
                }
            };
            let child = self.build(child_dir, child_file, text, Some(include.call));
            tree.children.push(child);
        }
        self.stack.pop();
        tree
    }
}

fn analyze_tree(tree: &mut SubdirTree, ns: &TypeNamespace, scope: Scope, out: &mut MesonMetadata) {
    let mut metadata = FileMetadata::default();
    if let Some(ast) = tree.ast.clone() {
        let started = Instant::now();
        let mut analysis = TypeAnalyzer::new(ns, &ast, &tree.file).analyze(scope);
        trace!(
            file = %tree.file.display(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "analyzed file"
        );
        metadata = std::mem::take(&mut analysis.metadata);
        for child in &mut tree.children {
            let child_scope = child
                .include_call
                .and_then(|call| analysis.subdir_scopes.iter().find(|s| s.call == call))
                .map(|s| s.scope.clone())
                .unwrap_or_else(|| Scope::root(ns));
            analyze_tree(child, ns, child_scope, out);
        }
        tree.analysis = Some(analysis);
    }
    metadata.diagnostics.extend(tree.include_diagnostics.iter().cloned());
    metadata.diagnostics.sort_by_key(|d| d.span.start.offset);
    out.replace(tree.file.clone(), metadata);
}

/// `subdir('literal')` call found before analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeCall {
    pub call: NodeId,
    pub dir: String,
    pub span: Span,
}

/// Every `subdir()` call with a plain string argument, in source order.
/// Calls with computed arguments are left to the analyzer, which warns about them.
pub fn literal_subdir_calls(ast: &Ast) -> Vec<IncludeCall> {
    struct Finder(Vec<IncludeCall>);

    impl Visitor for Finder {
        fn visit_function_expression(&mut self, ast: &Ast, id: NodeId) -> Walk {
            if ast.call_name(id) == Some("subdir")
                && let Some(first) = ast.positional_args(id).first()
                && let Some(dir) = ast.string_value(*first)
            {
                self.0.push(IncludeCall {
                    call: id,
                    dir: dir.to_string(),
                    span: ast.span(id),
                });
            }
            Walk::Continue
        }
    }

    let mut finder = Finder(Vec::new());
    ast.walk(&mut finder);
    finder.0
}

/// Resolve `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
