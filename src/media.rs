//! Media tree handling: directory copies and equation image discovery.

use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Image extensions accepted when a directory has no PNG files.
const FALLBACK_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif"];

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// Finds files with the given extension below `dir`, sorted by path.
pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();
        if path.is_file() && has_extension(path, extension) {
            result.push(path.to_path_buf());
        }
    }
    result.sort();
    Ok(result)
}

/// Copies `src` to `dst`, replacing any existing `dst`. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    fs::create_dir_all(dst)?;

    let mut copied = 0;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    debug!(src = %src.display(), dst = %dst.display(), copied, "copied directory");
    Ok(copied)
}

/// Locates the equation image directory.
///
/// Tries `explicit`, then `<input>/../docs/eq_images`, then `docs/eq_images`
/// under each ancestor of the input directory.
pub fn find_equation_images_dir(input_dir: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        if dir.is_dir() {
            return Some(dir.to_path_buf());
        }
        warn!(dir = %dir.display(), "configured equation image directory does not exist");
    }

    let sibling = input_dir.join("..").join("docs").join("eq_images");
    if sibling.is_dir() {
        return Some(sibling);
    }

    input_dir
        .ancestors()
        .map(|dir| dir.join("docs").join("eq_images"))
        .find(|candidate| candidate.is_dir())
}

/// Result of copying equation images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquationImageReport {
    pub copied: usize,
    pub missing: Vec<String>,
}

/// Copies equation images from `src` into `dest`.
///
/// PNG files are preferred; when there are none, JPEG and GIF files are
/// copied instead. Names in `expected` that are absent afterwards are reported.
pub fn copy_equation_images(src: &Path, dest: &Path, expected: &[&str]) -> Result<EquationImageReport> {
    fs::create_dir_all(dest)?;

    let list = |extensions: &[&str]| -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(src)? {
            let path = entry?.path();
            if path.is_file() && extensions.iter().any(|ext| has_extension(&path, ext)) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    };

    let mut images = list(&["png"])?;
    if images.is_empty() {
        warn!(dir = %src.display(), "no PNG equation images, looking for other formats");
        images = list(FALLBACK_IMAGE_EXTENSIONS)?;
    }

    let mut report = EquationImageReport::default();
    for image in &images {
        if let Some(name) = image.file_name() {
            fs::copy(image, dest.join(name))?;
            report.copied += 1;
        }
    }

    report.missing = expected
        .iter()
        .filter(|name| !dest.join(name).exists())
        .map(|name| name.to_string())
        .collect();

    if report.missing.is_empty() {
        info!(copied = report.copied, "copied equation images");
    } else {
        warn!(missing = ?report.missing, "expected equation images are missing");
    }
    Ok(report)
}
