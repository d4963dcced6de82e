use crate::errors::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Why a visited file was, or was not, accepted for substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Passed every filter; its content will be substituted.
    Eligible,
    /// Some path segment starts with a period and hidden paths are not included.
    Hidden,
    /// The file's suffix is not in the configured extension set.
    ExtensionFiltered,
    /// The file contains a NUL byte.
    Binary,
}

impl Classification {
    pub fn is_eligible(self) -> bool {
        self == Classification::Eligible
    }
}

/// Decides per-path eligibility from the hidden, extension and binary filters.
///
/// The cheap path-based filters run first, so the binary scan (the only one that
/// touches the filesystem) is only done for files that would otherwise be processed.
/// Hidden-ness is judged on the part of the path below the walk root: the root is
/// named explicitly by the operator and never hides its own contents.
#[derive(Debug, Clone)]
pub struct Classifier {
    include_hidden: bool,
    extensions: Vec<String>,
}

impl Classifier {
    pub fn new(include_hidden: bool, extensions: Vec<String>) -> Self {
        Self {
            include_hidden,
            extensions,
        }
    }

    /// Classifies a non-directory entry found under `root`.
    pub fn classify(&self, path: &Path, root: &Path) -> Result<Classification> {
        if !self.include_hidden && is_hidden(below_root(path, root)) {
            return Ok(Classification::Hidden);
        }
        if !extension_matches(path, &self.extensions) {
            return Ok(Classification::ExtensionFiltered);
        }
        if is_binary(path)? {
            return Ok(Classification::Binary);
        }
        Ok(Classification::Eligible)
    }

    /// Whether the walk should descend into `dir` at all.
    ///
    /// Everything below a hidden directory is itself hidden, so pruning it does not
    /// change which files are classified eligible.
    pub fn should_descend(&self, dir: &Path, root: &Path) -> bool {
        self.include_hidden || !is_hidden(below_root(dir, root))
    }
}

fn below_root<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Returns `true` if any slash-delimited segment of `path`, other than `.` and `..`,
/// starts with a period.
pub fn is_hidden(path: &Path) -> bool {
    path.to_string_lossy()
        .split(|c: char| c == '/' || std::path::is_separator(c))
        .filter(|segment| *segment != "." && *segment != "..")
        .any(|segment| segment.starts_with('.'))
}

/// The suffix of the final path element starting at its last period, e.g. `.go`.
///
/// A name whose only period is the leading one (`.bashrc`) is its own suffix;
/// a name without a period has none.
pub fn path_suffix(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    name.rfind('.').map(|idx| name[idx..].to_string())
}

/// Checks the path's suffix against the configured set.
///
/// An empty set accepts everything. Otherwise the suffix must equal one entry
/// exactly, leading dot and case included.
pub fn extension_matches(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }

    path_suffix(path)
        .map(|suffix| extensions.iter().any(|ext| *ext == suffix))
        .unwrap_or(false)
}

/// Scans the file for a `0x00` byte, stopping at the first one found.
pub fn is_binary(path: &Path) -> Result<bool> {
    let detection_error = |source: std::io::Error| Error::BinaryDetection {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(detection_error)?;
    let mut reader = BufReader::new(file);
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => return Ok(false),
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(detection_error(e)),
        };
        if buffer[..bytes_read].contains(&0) {
            return Ok(true);
        }
    }
}
