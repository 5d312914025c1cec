use std::{
    hash::{Hash, Hasher},
    path::PathBuf,
};

use tower_lsp::lsp_types::Url;
use twox_hash::XxHash64;

use crate::project::normalize;

pub(crate) fn compute_content_hash(content: &str) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    content.hash(&mut hasher);
    hasher.finish()
}

/// File path of a `file://` document, with `.` and `..` resolved.
pub(crate) fn url_to_path(url: &Url) -> Option<PathBuf> {
    url.to_file_path().ok().map(|p| normalize(&p))
}
