use std::path::PathBuf;

/// A change the editor reports. Every signal bumps the generation and
/// requests a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Open { path: PathBuf, text: String },
    Change { path: PathBuf, text: String },
    Save { path: PathBuf },
    Close { path: PathBuf },
    CreateFiles(Vec<PathBuf>),
    DeleteFiles(Vec<PathBuf>),
    /// Rebuild without any file change, e.g. on startup.
    Reload,
}

impl Signal {
    pub fn name(&self) -> &'static str {
        match self {
            Signal::Open { .. } => "open",
            Signal::Change { .. } => "change",
            Signal::Save { .. } => "save",
            Signal::Close { .. } => "close",
            Signal::CreateFiles(_) => "create",
            Signal::DeleteFiles(_) => "delete",
            Signal::Reload => "reload",
        }
    }
}
