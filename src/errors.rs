use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in the `sar` application.
///
/// Every variant that concerns a single filesystem entry carries its path so the
/// message printed by the binary is enough to find the offending file.
#[derive(Error, Debug)]
pub enum Error {
    /// The run configuration was rejected before any traversal started.
    #[error("Config error: {0}")]
    Config(String),

    /// A directory under the root could not be listed.
    #[error("Walk error at {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// Reading or writing the contents of a single file failed.
    #[error("File I/O failed for {path}: {source}")]
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file could not be opened or read while scanning for NUL bytes.
    #[error("Binary detection failed for {path}: {source}")]
    BinaryDetection {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Terminal I/O: writing the preview or reading the confirmation answer.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML defaults file could not be read or parsed.
    #[error("Config parsing error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// An error related to JSON serialization of a pass summary.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The literal matcher could not be built.
    #[error("Pattern compilation failed: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, sar::errors::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps a `walkdir` failure, keeping the path it happened at when known.
    pub fn walk(root: &std::path::Path, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| root.to_path_buf());
        Error::Walk { path, source }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Config(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Config(s.to_string())
    }
}
