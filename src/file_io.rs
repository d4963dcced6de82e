use crate::errors::{Error, Result};
use std::fs;
use std::path::Path;

/// Reads the whole file into memory.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites the whole file in place.
///
/// No temp-file swap and no backup: the existing file is truncated and rewritten,
/// keeping its inode and permissions.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::FileIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Exact byte-for-byte inequality.
pub fn file_changed(old_contents: &[u8], new_contents: &[u8]) -> bool {
    old_contents != new_contents
}
