//! Filesystem helpers shared by the harness binaries.

use std::fs;
use std::io;
use std::path::Path;

/// Creates `dir` and all missing parents. No-op if it already exists.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)
}

/// Writes `contents` to `path`, creating the parent directory first.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
}
