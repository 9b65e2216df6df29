//! Source tree detection.

use std::path::{Path, PathBuf};

/// Main document file name.
pub const MAIN_FILE: &str = "main.tex";

/// Subdirectories of an extracted bundle that commonly hold the sources.
const CANDIDATE_SUBDIRS: &[&str] = &["latex_source", "src", "main"];

/// Returns true if `dir` contains the main document.
pub fn is_source_root(dir: &Path) -> bool {
    dir.join(MAIN_FILE).is_file()
}

/// Locates the directory holding `main.tex` inside an extracted bundle.
///
/// Checks `dir` itself, then `latex_source/`, `src/` and `main/`; falls back
/// to `dir` when none of them has a main document.
pub fn locate_source_root(dir: &Path) -> PathBuf {
    std::iter::once(dir.to_path_buf())
        .chain(CANDIDATE_SUBDIRS.iter().map(|sub| dir.join(sub)))
        .find(|candidate| is_source_root(candidate))
        .unwrap_or_else(|| dir.to_path_buf())
}
