use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dashmap::{DashMap, DashSet};

/// Where file text comes from: editor buffers first, then the disk.
#[derive(Debug, Default)]
pub struct FileSource {
    overrides: DashMap<PathBuf, String>,
    open: DashSet<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text of `path`: the editor's override if one exists, the disk contents otherwise.
    pub fn read(&self, path: &Path) -> Result<String> {
        if let Some(text) = self.overrides.get(path) {
            return Ok(text.clone());
        }
        std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
    }

    /// True when `path` exists either as an override or on disk.
    pub fn exists(&self, path: &Path) -> bool {
        self.overrides.contains_key(path) || path.is_file()
    }

    pub fn set_override(&self, path: PathBuf, text: String) {
        self.overrides.insert(path, text);
    }

    pub fn remove_override(&self, path: &Path) {
        self.overrides.remove(path);
    }

    pub fn has_override(&self, path: &Path) -> bool {
        self.overrides.contains_key(path)
    }

    /// Mark `path` as open in the editor with `text` as its buffer.
    pub fn open(&self, path: PathBuf, text: String) {
        self.open.insert(path.clone());
        self.overrides.insert(path, text);
    }

    pub fn close(&self, path: &Path) {
        self.open.remove(path);
        self.overrides.remove(path);
    }

    /// Forget everything about `path`.
    pub fn evict(&self, path: &Path) {
        self.close(path);
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.open.contains(path)
    }

    pub fn open_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.open.iter().map(|p| p.clone()).collect();
        files.sort();
        files
    }
}
