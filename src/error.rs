//! Error types for texbook library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for texbook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for texbook library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive extraction error.
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// YAML serialization or configuration parsing error.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// An external tool (pandoc, pdftoppm, convert) exited unsuccessfully.
    #[error("{tool} failed (status {status:?}): {stderr}")]
    ExternalTool {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// A required input file or directory does not exist.
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// An expected structure was not found in a document.
    #[error("Pattern not found: {0}")]
    PatternNotFound(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(feature = "archive")]
impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Zip(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
