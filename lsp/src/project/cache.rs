use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use meson_core::ast::Ast;
use tracing::trace;

use crate::server::compute_content_hash;

#[derive(Debug, Clone)]
struct CacheEntry {
    hash: u64,
    ast: Arc<Ast>,
}

/// Parsed trees of files that are not open in the editor, keyed by path and
/// validated by a hash of the text they were parsed from.
///
/// Concurrent rebuilds may race on the same path; the last writer wins, which
/// is harmless since a tree is a pure function of its text.
#[derive(Debug, Default)]
pub struct AstCache {
    entries: DashMap<PathBuf, CacheEntry>,
}

impl AstCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree for `text`. Open files are always parsed fresh and never touch
    /// the cache: their buffer is the authority, not the disk-backed entry.
    pub fn get_or_parse(&self, path: &Path, text: &str, open: bool) -> Arc<Ast> {
        if open {
            trace!(path = %path.display(), "parsing open file");
            return Arc::new(Ast::parse(text));
        }
        let hash = compute_content_hash(text);
        if let Some(entry) = self.entries.get(path)
            && entry.hash == hash
        {
            return entry.ast.clone();
        }
        trace!(path = %path.display(), "parsing");
        let ast = Arc::new(Ast::parse(text));
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                hash,
                ast: ast.clone(),
            },
        );
        ast
    }

    /// Cached tree of `path`, whatever text it was parsed from.
    pub fn get(&self, path: &Path) -> Option<Arc<Ast>> {
        self.entries.get(path).map(|e| e.ast.clone())
    }

    pub fn evict(&self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
