//! ZIP source bundle extraction.

use crate::error::Result;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::info;
use zip::ZipArchive;

/// A manuscript source bundle.
pub struct SourceArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl SourceArchive<File> {
    /// Opens a bundle from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> SourceArchive<R> {
    /// Opens a bundle from a reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Lists entry names.
    pub fn file_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Extracts every entry below `dest`. Entries with unsafe paths are rejected.
    pub fn extract_to(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        std::fs::create_dir_all(dest)?;
        self.archive.extract(dest)?;
        info!(entries = self.archive.len(), dest = %dest.display(), "extracted archive");
        Ok(())
    }
}

/// Extracts the ZIP file at `zip_path` into `dest`.
pub fn extract_archive(zip_path: &Path, dest: &Path) -> Result<()> {
    SourceArchive::open(zip_path)?.extract_to(dest)
}
