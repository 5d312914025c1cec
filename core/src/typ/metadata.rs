use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use super::{Function, Origin, TypeSet};
use crate::{
    ast::NodeId,
    diagnostic::{Diagnostic, Severity},
    token::Span,
    util::{FastHashMap, fast_hash_map_new},
};

/// Read of a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierRef {
    pub node: NodeId,
    pub span: Span,
    pub name: String,
    pub types: TypeSet,
    /// Assignments that reach this read.
    pub origins: Vec<Origin>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub node: NodeId,
    pub span: Span,
    pub name: String,
    pub name_span: Span,
    pub function: Option<Arc<Function>>,
    pub types: TypeSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub node: NodeId,
    pub span: Span,
    pub name: String,
    pub name_span: Span,
    pub receiver: TypeSet,
    /// Every method the call may resolve to, one per distinct candidate.
    pub methods: Vec<Arc<Function>>,
    pub types: TypeSet,
}

/// `key: value` inside a call.
#[derive(Debug, Clone, PartialEq)]
pub struct KwargRef {
    pub node: NodeId,
    /// Span of the key.
    pub span: Span,
    pub name: String,
    pub call: NodeId,
    pub function: Option<Arc<Function>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubdirCall {
    pub node: NodeId,
    pub span: Span,
    /// Literal directory argument; `None` when it is not a plain string.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringRef {
    pub node: NodeId,
    pub span: Span,
    pub value: String,
}

/// `name = ...` and its compound forms, plus loop variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentRef {
    pub node: NodeId,
    pub lhs: NodeId,
    pub span: Span,
    pub name: String,
    pub types: TypeSet,
}

/// Everything one analysis pass learned about one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMetadata {
    pub identifiers: Vec<IdentifierRef>,
    pub calls: Vec<FunctionCall>,
    pub method_calls: Vec<MethodCall>,
    pub kwargs: Vec<KwargRef>,
    pub subdir_calls: Vec<SubdirCall>,
    pub strings: Vec<StringRef>,
    pub assignments: Vec<AssignmentRef>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Innermost entry whose span contains the position.
fn innermost<'a, T>(
    items: &'a [T],
    span: impl Fn(&T) -> Span,
    line: u32,
    column: u32,
) -> Option<&'a T> {
    items
        .iter()
        .filter(|item| span(item).contains(line, column))
        .min_by_key(|item| span(item).len())
}

impl FileMetadata {
    pub fn find_identifier_at(&self, line: u32, column: u32) -> Option<&IdentifierRef> {
        innermost(&self.identifiers, |i| i.span, line, column)
    }

    pub fn find_function_call_at(&self, line: u32, column: u32) -> Option<&FunctionCall> {
        innermost(&self.calls, |c| c.span, line, column)
    }

    pub fn find_method_call_at(&self, line: u32, column: u32) -> Option<&MethodCall> {
        innermost(&self.method_calls, |c| c.span, line, column)
    }

    pub fn find_kwarg_at(&self, line: u32, column: u32) -> Option<&KwargRef> {
        innermost(&self.kwargs, |k| k.span, line, column)
    }

    pub fn find_subdir_call_at(&self, line: u32, column: u32) -> Option<&SubdirCall> {
        innermost(&self.subdir_calls, |s| s.span, line, column)
    }

    pub fn find_string_at(&self, line: u32, column: u32) -> Option<&StringRef> {
        innermost(&self.strings, |s| s.span, line, column)
    }

    pub fn find_assignment_at(&self, line: u32, column: u32) -> Option<&AssignmentRef> {
        innermost(&self.assignments, |a| a.span, line, column)
    }

    /// Innermost call at the position whose callee resolved.
    pub fn find_full_function_call_at(&self, line: u32, column: u32) -> Option<&FunctionCall> {
        let resolved: Vec<&FunctionCall> = self.calls.iter().filter(|c| c.function.is_some()).collect();
        innermost(&resolved, |c| c.span, line, column).copied()
    }

    /// Innermost method call at the position with at least one resolved method.
    pub fn find_full_method_call_at(&self, line: u32, column: u32) -> Option<&MethodCall> {
        let resolved: Vec<&MethodCall> = self.method_calls.iter().filter(|c| !c.methods.is_empty()).collect();
        innermost(&resolved, |c| c.span, line, column).copied()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }
}

/// Metadata of every file in a project, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MesonMetadata {
    files: FastHashMap<PathBuf, FileMetadata>,
}

impl MesonMetadata {
    pub fn new() -> Self {
        MesonMetadata {
            files: fast_hash_map_new(),
        }
    }

    /// Store the result of a pass, replacing whatever the file had before.
    pub fn replace(&mut self, file: PathBuf, metadata: FileMetadata) {
        self.files.insert(file, metadata);
    }

    pub fn file(&self, file: &Path) -> Option<&FileMetadata> {
        self.files.get(file)
    }

    pub fn files(&self) -> impl Iterator<Item = (&Path, &FileMetadata)> {
        self.files.iter().map(|(p, m)| (p.as_path(), m))
    }

    pub fn diagnostics(&self, file: &Path) -> &[Diagnostic] {
        self.files.get(file).map(|m| m.diagnostics.as_slice()).unwrap_or(&[])
    }

    pub fn find_identifier_at(&self, file: &Path, line: u32, column: u32) -> Option<&IdentifierRef> {
        self.file(file)?.find_identifier_at(line, column)
    }

    pub fn find_function_call_at(&self, file: &Path, line: u32, column: u32) -> Option<&FunctionCall> {
        self.file(file)?.find_function_call_at(line, column)
    }

    pub fn find_method_call_at(&self, file: &Path, line: u32, column: u32) -> Option<&MethodCall> {
        self.file(file)?.find_method_call_at(line, column)
    }

    pub fn find_full_function_call_at(&self, file: &Path, line: u32, column: u32) -> Option<&FunctionCall> {
        self.file(file)?.find_full_function_call_at(line, column)
    }

    pub fn find_full_method_call_at(&self, file: &Path, line: u32, column: u32) -> Option<&MethodCall> {
        self.file(file)?.find_full_method_call_at(line, column)
    }

    pub fn find_kwarg_at(&self, file: &Path, line: u32, column: u32) -> Option<&KwargRef> {
        self.file(file)?.find_kwarg_at(line, column)
    }

    pub fn find_subdir_call_at(&self, file: &Path, line: u32, column: u32) -> Option<&SubdirCall> {
        self.file(file)?.find_subdir_call_at(line, column)
    }
}
