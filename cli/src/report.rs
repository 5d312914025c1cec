use std::path::{Path, PathBuf};

use meson_core::diagnostic::Diagnostic;
use serde::Serialize;

/// One diagnostic, positioned 1-based for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Finding {
    pub(crate) file: PathBuf,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) severity: String,
    pub(crate) message: String,
}

impl Finding {
    pub(crate) fn new(file: &Path, diagnostic: &Diagnostic) -> Self {
        Finding {
            file: file.to_path_buf(),
            line: diagnostic.span.start.line + 1,
            column: diagnostic.span.start.column + 1,
            severity: diagnostic.severity.to_string(),
            message: diagnostic.message.clone(),
        }
    }

    pub(crate) fn is_error(&self) -> bool {
        self.severity == "error"
    }

    /// `path:line:col: severity: message`, with `path` relative to `base`
    /// when it lies inside it.
    pub(crate) fn render(&self, base: &Path) -> String {
        let shown = self.file.strip_prefix(base).unwrap_or(&self.file);
        format!(
            "{}:{}:{}: {}: {}",
            shown.display(),
            self.line,
            self.column,
            self.severity,
            self.message
        )
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Summary<'a> {
    pub(crate) root: &'a Path,
    pub(crate) files: usize,
    pub(crate) errors: usize,
    pub(crate) warnings: usize,
    pub(crate) findings: &'a [Finding],
}

impl<'a> Summary<'a> {
    pub(crate) fn new(root: &'a Path, files: usize, findings: &'a [Finding]) -> Self {
        let errors = findings.iter().filter(|f| f.is_error()).count();
        let warnings = findings.iter().filter(|f| f.severity == "warning").count();
        Summary {
            root,
            files,
            errors,
            warnings,
            findings,
        }
    }
}
