//! Whole-file replacement via temp file + rename.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use super::StoreError;

/// Writes `bytes` to `path` so that readers observe either the previous
/// content or the new one.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    temp.write_all(bytes).map_err(|e| StoreError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
