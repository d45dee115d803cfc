use std::path::{Path, PathBuf};

/// Directory that marks a project holding a decision journal.
pub const KEEL_DIR: &str = ".keel";

/// Walk upwards from `start` until a directory containing `marker` is found.
#[must_use]
pub fn find_ancestor_with(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(marker).exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Project root for commands run from `start`.
///
/// The nearest ancestor with a `.keel` directory wins. Before the first
/// decision is recorded there is none, so the enclosing git repository is
/// used, and failing that `start` itself.
#[must_use]
pub fn detect_project_root(start: &Path) -> PathBuf {
    find_ancestor_with(start, KEEL_DIR)
        .filter(|root| root.join(KEEL_DIR).is_dir())
        .or_else(|| find_ancestor_with(start, ".git"))
        .unwrap_or_else(|| start.to_path_buf())
}
